use thiserror::Error;

/// Reasons a character cannot join the party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("no such person is waiting to join")]
    NotFound,
    #[error("the Avatar is not experienced enough to lead a larger party")]
    NotExperienced,
    #[error("the Avatar is not virtuous enough")]
    NotVirtuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HealError {
    #[error("not poisoned")]
    NotPoisoned,
    #[error("cannot heal the dead")]
    Dead,
    #[error("already at full health")]
    AlreadyFullHealth,
    #[error("not dead")]
    NotDead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DonateError {
    #[error("not enough gold")]
    InsufficientGold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TorchError {
    #[error("none left")]
    NoneLeft,
}
