use crate::error::{Result, SentimentError};
use candle_core::Device;

/// Which compute device a classifier should load onto.
///
/// Resolved once, when the classifier initializes; never per call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceRequest {
    /// Prefer an accelerator (CUDA, then Metal) and fall back to CPU.
    #[default]
    Auto,
    /// Force CPU even if an accelerator is available.
    Cpu,
    /// Select a specific CUDA device by index.
    Cuda(usize),
}

impl DeviceRequest {
    /// Resolve the request into an actual [`Device`].
    pub fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Auto => {
                if candle_core::utils::cuda_is_available() {
                    Device::new_cuda(0).map_err(|e| {
                        SentimentError::Device(format!("Failed to init CUDA device 0: {e}"))
                    })
                } else if candle_core::utils::metal_is_available() {
                    Device::new_metal(0).map_err(|e| {
                        SentimentError::Device(format!("Failed to init Metal device 0: {e}"))
                    })
                } else {
                    Ok(Device::Cpu)
                }
            }
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => Device::new_cuda(i).map_err(|e| {
                SentimentError::Device(format!(
                    "Failed to init CUDA device {i}: {e}. Try CPU as fallback."
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_auto() {
        assert_eq!(DeviceRequest::default(), DeviceRequest::Auto);
    }

    #[test]
    fn cpu_always_resolves() {
        let device = DeviceRequest::Cpu.resolve().unwrap();
        assert!(device.is_cpu());
    }

    #[cfg(not(any(feature = "cuda", feature = "metal")))]
    #[test]
    fn auto_without_accelerator_support_is_cpu() {
        let device = DeviceRequest::Auto.resolve().unwrap();
        assert!(device.is_cpu());
    }
}
