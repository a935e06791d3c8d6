/// Anything that can hand out one raw ADC sample of the moisture sensor.
pub trait RawSampleSource {
    fn read_raw_sample(&mut self) -> anyhow::Result<i32>;
}
