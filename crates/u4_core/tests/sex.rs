use u4_core::sex::Sex;

#[test]
fn maps_known_sex_codes() {
    assert_eq!(Sex::from_raw(0x0B), Sex::Male);
    assert_eq!(Sex::from_raw(0x0C), Sex::Female);
}

#[test]
fn preserves_unknown_codes() {
    assert_eq!(Sex::from_raw(0), Sex::Unknown(0));
    assert_eq!(Sex::from_raw(0x7F).raw(), 0x7F);
    assert_eq!(Sex::Unknown(0x7F).to_string(), "Unknown (0x7f)");
}

#[test]
fn only_glyph_codes_are_known() {
    assert!(Sex::Female.is_known());
    assert!(!Sex::from_raw(0x0D).is_known());
}
