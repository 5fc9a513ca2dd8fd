use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use embedded_hal::delay::DelayNs;

pub(crate) fn u16_from_hex(value: &str) -> Result<u16, std::num::ParseIntError> {
    let s = if value.to_ascii_lowercase().starts_with("0x") {
        &value[2..]
    } else {
        value
    };
    u16::from_str_radix(s, 16)
}

/// Parse a non-negative number of seconds, such as `3.5`.
pub(crate) fn seconds(value: &str) -> Result<Duration, String> {
    let secs: f64 = value.parse().map_err(|e| format!("{e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("{value} is not a usable pause"))
}

static STOP: AtomicBool = AtomicBool::new(false);

/// Make Ctrl-C end the command loops instead of killing the process, so that the
/// GP pins are restored on the way out.
pub(crate) fn stop_on_ctrl_c() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| STOP.store(true, Ordering::Relaxed))
}

pub(crate) fn stop_requested() -> bool {
    STOP.load(Ordering::Relaxed)
}

/// Blocking delay for the host.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct HostDelay;

impl DelayNs for HostDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns.into()));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex_with_and_without_prefix() {
        assert_eq!(u16_from_hex("0x4D8"), Ok(0x04D8));
        assert_eq!(u16_from_hex("0XDD"), Ok(0xDD));
        assert_eq!(u16_from_hex("dd"), Ok(0xDD));
        assert!(u16_from_hex("0xG1").is_err());
    }

    #[test]
    fn pause_seconds() {
        assert_eq!(seconds("3.5"), Ok(Duration::from_millis(3500)));
        assert!(seconds("-1").is_err());
        assert!(seconds("soon").is_err());
    }
}
