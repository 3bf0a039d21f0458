use serde::{Deserialize, Serialize};

/// Appliances inserted on first run when the store holds no devices.
pub const DEFAULT_DEVICES: &[(&str, f64)] = &[
    ("Refrigerator", 250.0),
    ("Living Room Lamp", 60.0),
    ("Kitchen Lamp", 60.0),
    ("Bathroom Lamp", 60.0),
    ("Bathroom Shower", 2100.0),
    ("Air Conditioner", 2000.0),
    ("TV", 100.0),
];

/// Energy in kWh drawn by a load of `power_watts` running for `hours_on`.
pub fn consumption_kwh(power_watts: f64, hours_on: f64) -> f64 {
    power_watts * hours_on / 1000.0
}

/// A registered appliance together with its runtime in the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub rated_power_watts: f64,
    #[serde(default)]
    pub hours_on: f64,
}

impl Device {
    pub fn new(name: impl Into<String>, rated_power_watts: f64) -> Self {
        Self {
            name: name.into(),
            rated_power_watts,
            hours_on: 0.0,
        }
    }

    pub fn with_hours(mut self, hours_on: f64) -> Self {
        self.hours_on = hours_on;
        self
    }

    /// Consumption for the hours recorded so far in this session.
    pub fn current_consumption(&self) -> f64 {
        consumption_kwh(self.rated_power_watts, self.hours_on)
    }
}
