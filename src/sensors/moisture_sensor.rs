use std::borrow::Borrow;

use esp_idf_svc::hal::adc::{
    attenuation,
    oneshot::{config::AdcChannelConfig, AdcChannelDriver, AdcDriver},
    Adc,
};
use esp_idf_svc::hal::gpio::ADCPin;

use super::sensor::RawSampleSource;

/// Capacitive soil sensor on an ADC1 pin, read as a raw 12-bit value.
pub struct MoistureSensor<'a, ADC: Adc + 'a, APin: ADCPin<Adc = ADC>, M: Borrow<AdcDriver<'a, ADC>>>
{
    channel: AdcChannelDriver<'a, APin, M>,
}

impl<'a, ADC: Adc + 'a, APin: ADCPin<Adc = ADC>, M: Borrow<AdcDriver<'a, ADC>>>
    MoistureSensor<'a, ADC, APin, M>
{
    pub fn new(adc_driver: M, pin_adc: APin) -> anyhow::Result<Self> {
        Ok(Self {
            channel: AdcChannelDriver::new(
                adc_driver,
                pin_adc,
                &AdcChannelConfig {
                    attenuation: attenuation::DB_11,
                    calibration: false,
                    ..Default::default()
                },
            )?,
        })
    }
}

impl<'a, ADC: Adc + 'a, APin: ADCPin<Adc = ADC>, M: Borrow<AdcDriver<'a, ADC>>> RawSampleSource
    for MoistureSensor<'a, ADC, APin, M>
{
    fn read_raw_sample(&mut self) -> anyhow::Result<i32> {
        Ok(self.channel.read_raw()? as i32)
    }
}
