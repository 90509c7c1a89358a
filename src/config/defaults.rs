use std::time::Duration;

pub(super) const fn default_max_visible() -> usize {
    5
}

pub(super) const fn default_gap() -> u16 {
    14
}

pub(super) const fn default_duration() -> Duration {
    Duration::from_secs(4)
}

pub(super) const fn default_event_buffer() -> usize {
    64
}

pub(super) const fn default_tombstones() -> usize {
    256
}
