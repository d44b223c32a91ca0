#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InferenceDevice {
    #[default] CPU,
    CUDA(usize),
}

// Storing the "proper" spelling and the lowercase version.
const CPU: [&str; 2] = ["CPU", "cpu"];
const CUDA: [&str; 2] = ["CUDA", "cuda"];

impl InferenceDevice {
    /// Accepts `cpu`, `cuda` or `cuda:<id>`.
    pub fn from_str(device: &str) -> Option<Self> {
        let device = device.trim().to_lowercase();
        let (name, id) = match device.split_once(':') {
            Some((name, id)) => (name.to_string(), id.parse::<usize>().ok()?),
            None => (device, 0),
        };
        match name.as_str() {
            "cpu" => Some(InferenceDevice::CPU),
            "cuda" => Some(InferenceDevice::CUDA(id)),
            _ => None,
        }
    }

    pub fn str(&self) -> &'static str {
        match self {
            InferenceDevice::CPU => CPU[0],
            InferenceDevice::CUDA(_) => CUDA[0],
        }
    }

    pub fn str_lowercase(&self) -> &'static str {
        match self {
            InferenceDevice::CPU => CPU[1],
            InferenceDevice::CUDA(_) => CUDA[1],
        }
    }
}

impl std::fmt::Display for InferenceDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceDevice::CPU => write!(f, "{}", self.str()),
            InferenceDevice::CUDA(id) => write!(f, "{}:{}", self.str(), id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_names() {
        assert_eq!(InferenceDevice::from_str("CPU"), Some(InferenceDevice::CPU));
        assert_eq!(InferenceDevice::from_str("cuda"), Some(InferenceDevice::CUDA(0)));
        assert_eq!(InferenceDevice::from_str("cuda:1"), Some(InferenceDevice::CUDA(1)));
        assert_eq!(InferenceDevice::from_str("cuda:x"), None);
        assert_eq!(InferenceDevice::from_str("tpu"), None);
    }
}
