use esp_idf_svc::hal::{
    adc::{oneshot::AdcDriver, ADC1},
    gpio::{Gpio0, Gpio26, Gpio34, Input, Output, OutputPin, PinDriver, Pins, Pull},
};
use log::info;

use crate::{relay::Relay, sensors::moisture_sensor::MoistureSensor};

pub struct RelayOutput<'a, P: OutputPin> {
    pin: PinDriver<'a, P, Output>,
}

impl<'a, P: OutputPin> RelayOutput<'a, P> {
    pub fn new(pin: P) -> anyhow::Result<Self> {
        let mut s = Self {
            pin: PinDriver::output(pin)?,
        };

        s.pin.set_low()?;
        Ok(s)
    }
}

impl<'a, P: OutputPin> Relay for RelayOutput<'a, P> {
    fn set_state(&mut self, on: bool) -> anyhow::Result<()> {
        if on {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }

        info!("Relay {}", if on { "on" } else { "off" });
        Ok(())
    }
}

pub struct Board<'a> {
    pub moisture_sensor: MoistureSensor<'a, ADC1, Gpio34, AdcDriver<'a, ADC1>>,
    pub relay: RelayOutput<'a, Gpio26>,
    pub settings_button: PinDriver<'a, Gpio0, Input>,
}

impl<'a> Board<'a> {
    pub fn new(adc_1: ADC1, pins: Pins) -> anyhow::Result<Self> {
        let mut s = Self {
            moisture_sensor: MoistureSensor::new(AdcDriver::new(adc_1)?, pins.gpio34)?,
            relay: RelayOutput::new(pins.gpio26)?,
            settings_button: PinDriver::input(pins.gpio0)?,
        };

        s.settings_button.set_pull(Pull::Up)?;
        Ok(s)
    }

    /// The BOOT button is held down.
    pub fn settings_requested(&self) -> bool {
        self.settings_button.is_low()
    }
}
