use serde::{Deserialize, Serialize};

/// An airport record as stored and served by this service.
///
/// `faa` is the unique, immutable identifier. The descriptive attributes
/// come from the aviation directory provider, which encodes "not populated"
/// as an empty string; `weather` holds the last observed condition text and
/// is refreshed by the sync engine.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Airport {
    #[serde(default)]
    pub site_number: String,
    #[serde(default)]
    pub facility_name: String,
    pub faa: String,
    #[serde(default)]
    pub icao: String,
    #[serde(default)]
    pub state_code: String,
    #[serde(default)]
    pub state_full: String,
    #[serde(default)]
    pub county: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub ownership_type: String,
    #[serde(default)]
    pub use_type: String,
    #[serde(default)]
    pub manager: String,
    #[serde(default)]
    pub manager_phone: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
    #[serde(default)]
    pub airport_status: String,
    #[serde(default)]
    pub weather: String,
}

impl Airport {
    /// A record with only an identifier, as seeded before the first sync.
    pub fn stub(faa: impl Into<String>) -> Self {
        Airport {
            faa: faa.into(),
            ..Airport::default()
        }
    }

    /// True when any descriptive attribute is missing.
    ///
    /// Incomplete records need a directory refetch before their weather can
    /// be refreshed; `weather` itself does not count, it is always refreshed.
    pub fn is_incomplete(&self) -> bool {
        [
            &self.site_number,
            &self.facility_name,
            &self.icao,
            &self.state_code,
            &self.state_full,
            &self.county,
            &self.city,
            &self.ownership_type,
            &self.use_type,
            &self.manager,
            &self.manager_phone,
            &self.latitude,
            &self.longitude,
            &self.airport_status,
        ]
        .iter()
        .any(|field| field.is_empty())
    }
}
