//! Readable interpretations of the air quality values.

/// Self-calibration state of the air quality data.
///
/// The board reports this as a code from 0 to 3. It says how far the gas sensor's
/// self-calibration has progressed, not how good the air is. Any code outside that
/// range is treated as not yet valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AqiAccuracy {
    /// Self-calibration incomplete; air quality values are meaningless.
    NotYetValid,
    /// Low accuracy, self-calibration ongoing.
    Low,
    /// Medium accuracy, self-calibration ongoing.
    Medium,
    /// High accuracy.
    High,
}

impl From<u8> for AqiAccuracy {
    fn from(code: u8) -> Self {
        match code {
            1 => AqiAccuracy::Low,
            2 => AqiAccuracy::Medium,
            3 => AqiAccuracy::High,
            0 => AqiAccuracy::NotYetValid,
            _ => {
                log::warn!("Unrecognised air quality accuracy code {code}");
                AqiAccuracy::NotYetValid
            }
        }
    }
}

impl AqiAccuracy {
    /// Description of the calibration state.
    pub fn description(self) -> &'static str {
        match self {
            AqiAccuracy::NotYetValid => "Not yet valid, self-calibration incomplete",
            AqiAccuracy::Low => "Low accuracy, self-calibration ongoing",
            AqiAccuracy::Medium => "Medium accuracy, self-calibration ongoing",
            AqiAccuracy::High => "High accuracy",
        }
    }
}

impl std::fmt::Display for AqiAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Describe an air quality accuracy code.
pub fn interpret_accuracy(code: u8) -> &'static str {
    AqiAccuracy::from(code).description()
}

/// Description of an air quality index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AqiRating {
    /// AQI below 50.
    Good,
    /// AQI from 50 to below 100.
    Acceptable,
    /// AQI from 100 to below 150.
    Substandard,
    /// AQI from 150 to below 200.
    Poor,
    /// AQI from 200 to below 300.
    Bad,
    /// AQI of 300 or more.
    VeryBad,
}

impl AqiRating {
    /// Classify an air quality index value.
    ///
    /// Each band's upper bound is exclusive: 49.9 is good, 50.0 is acceptable.
    pub fn from_aqi(aqi: f32) -> Self {
        const BANDS: [(f32, AqiRating); 5] = [
            (50.0, AqiRating::Good),
            (100.0, AqiRating::Acceptable),
            (150.0, AqiRating::Substandard),
            (200.0, AqiRating::Poor),
            (300.0, AqiRating::Bad),
        ];
        BANDS
            .iter()
            .find(|(upper, _)| aqi < *upper)
            .map_or(AqiRating::VeryBad, |&(_, rating)| rating)
    }

    /// Description of the air quality.
    pub fn description(self) -> &'static str {
        match self {
            AqiRating::Good => "Good",
            AqiRating::Acceptable => "Acceptable",
            AqiRating::Substandard => "Substandard",
            AqiRating::Poor => "Poor",
            AqiRating::Bad => "Bad",
            AqiRating::VeryBad => "Very bad",
        }
    }
}

impl std::fmt::Display for AqiRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Describe an air quality index value.
pub fn interpret_aqi(aqi: f32) -> &'static str {
    AqiRating::from_aqi(aqi).description()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn aqi_band_upper_bounds_are_exclusive() {
        assert_eq!(interpret_aqi(49.9), "Good");
        assert_eq!(interpret_aqi(50.0), "Acceptable");
        assert_eq!(interpret_aqi(99.9), "Acceptable");
        assert_eq!(interpret_aqi(100.0), "Substandard");
        assert_eq!(interpret_aqi(150.0), "Poor");
        assert_eq!(interpret_aqi(200.0), "Bad");
        assert_eq!(interpret_aqi(299.9), "Bad");
        assert_eq!(interpret_aqi(300.0), "Very bad");
        assert_eq!(interpret_aqi(500.0), "Very bad");
    }

    #[test]
    fn zero_aqi_is_good() {
        assert_eq!(AqiRating::from_aqi(0.0), AqiRating::Good);
    }

    #[test]
    fn accuracy_codes() {
        assert_eq!(
            interpret_accuracy(0),
            "Not yet valid, self-calibration incomplete"
        );
        assert_eq!(interpret_accuracy(1), "Low accuracy, self-calibration ongoing");
        assert_eq!(
            interpret_accuracy(2),
            "Medium accuracy, self-calibration ongoing"
        );
        assert_eq!(interpret_accuracy(3), "High accuracy");
    }

    #[test]
    fn unknown_accuracy_code_is_not_yet_valid() {
        assert_eq!(AqiAccuracy::from(4), AqiAccuracy::NotYetValid);
        assert_eq!(AqiAccuracy::from(255), AqiAccuracy::NotYetValid);
    }
}
