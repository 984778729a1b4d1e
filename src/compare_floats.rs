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

/// Restrict a value to the closed range `[lower, upper]`.
pub(crate) fn clamp_to_range(value: f64, lower: f64, upper: f64) -> f64 {
    min_of_2(max_of_2(value, lower), upper)
}

/// Largest finite value in an iterator, skipping NaNs. `None` when nothing is left.
pub(crate) fn nan_max(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values
        .into_iter()
        .filter(|value| !value.is_nan())
        .reduce(max_of_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    pub fn should_calc_2_as_min_of_2_and_4_ints() {
        assert_eq!(min_of_2(2, 4), 2);
    }

    #[rstest]
    pub fn should_calc_2_as_min_of_4_and_2_floats() {
        assert_eq!(min_of_2(4., 2.), 2.);
    }

    #[rstest]
    pub fn should_calc_4_as_max_of_4_and_2_floats() {
        assert_eq!(max_of_2(4., 2.), 4.);
    }

    #[rstest]
    #[case(-12.5, 0.)]
    #[case(55.5, 55.5)]
    #[case(130., 100.)]
    pub fn should_clamp_scores_to_range(#[case] value: f64, #[case] expected: f64) {
        assert_eq!(clamp_to_range(value, 0., 100.), expected);
    }

    #[rstest]
    pub fn should_skip_nans_in_nan_max() {
        assert_eq!(nan_max([2600., f64::NAN, 3120., 1800.]), Some(3120.));
        assert_eq!(nan_max([f64::NAN]), None);
        assert_eq!(nan_max(Vec::<f64>::new()), None);
    }
}
