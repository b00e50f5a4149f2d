
use std::time::Duration;

use crate::vklint;

/// Time-out used when waiting on fences or acquiring swapchain images.
#[derive(Debug, Copy, Clone)]
pub enum VkTimeDuration {
    Immediate,
    Time(Duration),
    Infinite,
}

impl From<VkTimeDuration> for vklint {

    fn from(time: VkTimeDuration) -> vklint {
        match time {
            | VkTimeDuration::Immediate => 0,
            | VkTimeDuration::Time(time) =>
                (time.subsec_nanos() as vklint).saturating_add(time.as_secs().saturating_mul(1_000_000_000)),
            | VkTimeDuration::Infinite => vklint::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_convert_to_nanoseconds() {
        assert_eq!(vklint::from(VkTimeDuration::Immediate), 0);
        assert_eq!(vklint::from(VkTimeDuration::Time(Duration::from_millis(1500))), 1_500_000_000);
        assert_eq!(vklint::from(VkTimeDuration::Infinite), u64::MAX);
    }

    #[test]
    fn huge_durations_saturate() {
        let forever = VkTimeDuration::Time(Duration::from_secs(u64::MAX));
        assert_eq!(vklint::from(forever), u64::MAX);
    }
}
