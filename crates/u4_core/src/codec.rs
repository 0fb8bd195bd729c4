use std::io::{self, Read, Write};

/// Fixed-width little-endian field reader. Tracks how many bytes have been
/// consumed so callers can record section boundaries without `Seek`.
pub struct LittleEndianReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> LittleEndianReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        let buf = self.read_array::<1>()?;
        Ok(buf[0])
    }

    pub fn read_u16(&mut self) -> io::Result<u16> {
        Ok(u16::from_le_bytes(self.read_array::<2>()?))
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        Ok(u32::from_le_bytes(self.read_array::<4>()?))
    }

    pub fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        self.position += N as u64;
        Ok(buf)
    }

    pub fn read_u16_array<const N: usize>(&mut self) -> io::Result<[u16; N]> {
        let mut result = [0u16; N];
        for item in &mut result {
            *item = self.read_u16()?;
        }
        Ok(result)
    }

    pub fn position(&self) -> u64 {
        self.position
    }
}

/// Fixed-width little-endian field writer, the mirror of [`LittleEndianReader`].
pub struct LittleEndianWriter<W> {
    inner: W,
    position: u64,
}

impl<W: Write> LittleEndianWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, position: 0 }
    }

    pub fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> io::Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> io::Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    pub fn write_u16_slice(&mut self, values: &[u16]) -> io::Result<()> {
        for &value in values {
            self.write_u16(value)?;
        }
        Ok(())
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
