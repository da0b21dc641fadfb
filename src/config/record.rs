//! Binary record format of a persisted [`Configuration`].
//!
//! ## Format
//!
//! ```text
//! ┌───────┬─────────┬──────────┬───────┬────────┬─────────┬───────┬──────────┐
//! │ magic │ version │ pin_mask │ flags │ switch │ actions │ relay │ long     │
//! │  (1)  │   (1)   │  (4 LE)  │  (1)  │  type  │   (1)   │  (1)  │ press(1) │
//! ├───────┴─────────┴──────────┴───────┴──(1)───┴─────────┴───────┴──────────┤
//! │ max_pause (2 LE) │ min_long_press (2 LE) │ n (1) │ groups (2 LE × n) │ sum │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `flags`: bit 0 client-only, bit 1 server disabled, bit 2 relay to bound,
//! bit 3 local level, bit 4 restore last state, bit 5 last on.
//! `sum` is the wrapping byte sum of everything before it.

use crate::config::{
    Configuration, EndpointMode, LongPressMode, RelayMode, SwitchActions, SwitchType, MAX_GROUPS,
};
use crate::error::{Result, SwitchError};

/// First byte of every record
pub const RECORD_MAGIC: u8 = 0x5A;
/// Current record layout version
pub const RECORD_VERSION: u8 = 1;
/// Size of the fixed part (before the group list)
const HEADER_LEN: usize = 16;
/// Largest possible record
pub const MAX_RECORD_LEN: usize = HEADER_LEN + 2 * MAX_GROUPS + 1;

const FLAG_CLIENT_ONLY: u8 = 0x01;
const FLAG_DISABLE_SERVER: u8 = 0x02;
const FLAG_RELAY_TO_BOUND: u8 = 0x04;
const FLAG_LOCAL_LEVEL: u8 = 0x08;
const FLAG_RESTORE_STATE: u8 = 0x10;
const FLAG_LAST_ON: u8 = 0x20;

/// Encode `cfg` into `buf`.
///
/// # Returns
/// Number of bytes written
///
/// # Errors
/// Returns `Persistence(BufferTooSmall)` if `buf` is shorter than the record
pub fn encode(cfg: &Configuration, buf: &mut [u8]) -> Result<usize> {
    let len = HEADER_LEN + 2 * cfg.groups.len() + 1;
    if buf.len() < len {
        return Err(SwitchError::buffer_too_small());
    }

    let mut flags = 0u8;
    if cfg.mode == EndpointMode::ClientOnly {
        flags |= FLAG_CLIENT_ONLY;
    }
    if cfg.disable_server {
        flags |= FLAG_DISABLE_SERVER;
    }
    if cfg.relay_to_bound {
        flags |= FLAG_RELAY_TO_BOUND;
    }
    if cfg.local_level {
        flags |= FLAG_LOCAL_LEVEL;
    }
    if cfg.restore_last_state {
        flags |= FLAG_RESTORE_STATE;
    }
    if cfg.last_on {
        flags |= FLAG_LAST_ON;
    }

    buf[0] = RECORD_MAGIC;
    buf[1] = RECORD_VERSION;
    buf[2..6].copy_from_slice(&cfg.pin_mask.to_le_bytes());
    buf[6] = flags;
    buf[7] = cfg.switch_type as u8;
    buf[8] = cfg.switch_actions as u8;
    buf[9] = cfg.relay_mode as u8;
    buf[10] = cfg.long_press_mode as u8;
    buf[11..13].copy_from_slice(&cfg.max_pause_ms.to_le_bytes());
    buf[13..15].copy_from_slice(&cfg.min_long_press_ms.to_le_bytes());
    buf[15] = cfg.groups.len() as u8;

    let mut offset = HEADER_LEN;
    for group in &cfg.groups {
        buf[offset..offset + 2].copy_from_slice(&group.to_le_bytes());
        offset += 2;
    }

    buf[offset] = checksum(&buf[..offset]);
    Ok(len)
}

/// Decode a record previously written by [`encode`].
///
/// # Errors
/// Returns `Persistence(Corrupt)` for a wrong magic, unknown version, bad
/// checksum, truncated data or out-of-range field
pub fn decode(data: &[u8]) -> Result<Configuration> {
    if data.len() < HEADER_LEN + 1 || data[0] != RECORD_MAGIC || data[1] != RECORD_VERSION {
        return Err(SwitchError::corrupt_record());
    }

    let count = usize::from(data[15]);
    if count > MAX_GROUPS {
        return Err(SwitchError::corrupt_record());
    }
    let body_len = HEADER_LEN + 2 * count;
    if data.len() < body_len + 1 || checksum(&data[..body_len]) != data[body_len] {
        return Err(SwitchError::corrupt_record());
    }

    let flags = data[6];
    let mut cfg = Configuration {
        pin_mask: u32::from_le_bytes([data[2], data[3], data[4], data[5]]),
        mode: if flags & FLAG_CLIENT_ONLY != 0 {
            EndpointMode::ClientOnly
        } else {
            EndpointMode::ServerCapable
        },
        disable_server: flags & FLAG_DISABLE_SERVER != 0,
        switch_type: SwitchType::try_from(data[7]).map_err(|_| SwitchError::corrupt_record())?,
        switch_actions: SwitchActions::try_from(data[8]).map_err(|_| SwitchError::corrupt_record())?,
        relay_mode: RelayMode::try_from(data[9]).map_err(|_| SwitchError::corrupt_record())?,
        long_press_mode: LongPressMode::try_from(data[10]).map_err(|_| SwitchError::corrupt_record())?,
        max_pause_ms: u16::from_le_bytes([data[11], data[12]]),
        min_long_press_ms: u16::from_le_bytes([data[13], data[14]]),
        relay_to_bound: flags & FLAG_RELAY_TO_BOUND != 0,
        local_level: flags & FLAG_LOCAL_LEVEL != 0,
        restore_last_state: flags & FLAG_RESTORE_STATE != 0,
        last_on: flags & FLAG_LAST_ON != 0,
        groups: heapless::Vec::new(),
    };

    for chunk in data[HEADER_LEN..body_len].chunks_exact(2) {
        let group = u16::from_le_bytes([chunk[0], chunk[1]]);
        cfg.groups.push(group).map_err(|_| SwitchError::corrupt_record())?;
    }

    Ok(cfg)
}

fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}
