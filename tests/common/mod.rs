//! Big-endian readers for checking emitted bytes.
#![allow(dead_code)]

pub fn take_u16(buf: &mut &[u8]) -> u16 {
    let mut be = [0u8; 2];
    be.copy_from_slice(&buf[..2]);
    *buf = &buf[2..];
    u16::from_be_bytes(be)
}

pub fn take_u32(buf: &mut &[u8]) -> u32 {
    let mut be = [0u8; 4];
    be.copy_from_slice(&buf[..4]);
    *buf = &buf[4..];
    u32::from_be_bytes(be)
}

pub fn u32_at(bytes: &[u8], off: usize) -> u32 {
    take_u32(&mut &bytes[off..])
}

pub fn pad(n: usize) -> usize {
    (8 - n % 8) % 8
}
