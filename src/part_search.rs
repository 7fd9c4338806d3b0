//! Vehicle context for part search: the make/model/year and VIN the user is
//! currently searching under. The last complete combination survives a plain
//! clear so the user can return to it; switching shops wipes everything,
//! since the vehicle belongs to the customer being served.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeModelYear {
    pub make: String,
    pub model: String,
    pub year: String,
}

impl MakeModelYear {
    /// Only complete combinations are worth restoring later.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.make.is_empty() && !self.model.is_empty() && !self.year.is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.make.is_empty() && self.model.is_empty() && self.year.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSearchContext {
    pub current_mmy: MakeModelYear,
    pub last_mmy: MakeModelYear,
    pub current_vin: String,
    pub last_vin: String,
    pub vin_history: Vec<String>,
}

impl PartSearchContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current make/model/year. Complete combinations are also
    /// remembered as the last one; partial edits leave the last untouched.
    pub fn set_mmy(&mut self, mmy: MakeModelYear) {
        if mmy.is_complete() {
            self.last_mmy = mmy.clone();
        }
        self.current_mmy = mmy;
    }

    /// Sets the current VIN, remembering non-empty values as the last VIN
    /// and appending fresh ones to the lookup history.
    pub fn set_vin(&mut self, vin: String) {
        if !vin.is_empty() {
            self.last_vin = vin.clone();
            if self.vin_history.last() != Some(&vin) {
                self.vin_history.push(vin.clone());
            }
        }
        self.current_vin = vin;
    }

    /// Clears the active search but keeps the last MMY and VIN for
    /// restoration.
    pub fn clear(&mut self) {
        self.current_mmy = MakeModelYear::default();
        self.current_vin.clear();
        self.vin_history.clear();
    }

    /// Full wipe, used when the shop changes or the session ends.
    pub fn clear_all(&mut self) {
        *self = Self::default();
    }
}
