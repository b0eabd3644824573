pub fn min_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first < second {
        first
    } else {
        second
    }
}

pub fn max_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first > second {
        first
    } else {
        second
    }
}

/// Clamp a value to an inclusive band. Used wherever a physical quantity has a
/// fixed plausible range (efficiencies, buffer energy, service fractions).
pub fn clamp_to_band<T: PartialOrd + Copy>(value: T, low: T, high: T) -> T {
    debug_assert!(low <= high);
    max_of_2(low, min_of_2(value, high))
}
