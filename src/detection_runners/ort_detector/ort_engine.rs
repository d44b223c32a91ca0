//! ONNX Runtime backend.

use anyhow::Result;
use half::{bf16, f16};
use ndarray::{Array, IxDyn};
use ort::{
    execution_providers::{CPUExecutionProvider, CUDAExecutionProvider, ExecutionProvider},
    session::builder::{GraphOptimizationLevel, SessionBuilder},
    session::{Session, SessionInputValue},
    tensor::{PrimitiveTensorElementType, TensorElementType},
    value::{DynValue, Tensor},
};
use crate::common::InferenceDevice;
use crate::data::{ConfigOrt, TimeCalc, CROSS_MARK};
use crate::detection_runners::ort_detector::input_wrapper::{X, Xs};
use crate::utils::human_bytes;

#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    device: InferenceDevice,
    in_dtypes: Vec<TensorElementType>,
    in_shapes: Vec<Vec<i64>>,
    out_names: Vec<String>,
    out_dtypes: Vec<TensorElementType>,
    pub infer_time: TimeCalc,
}

impl OrtEngine {
    pub fn new(config: &ConfigOrt) -> Result<Self> {
        if let Some(lib_path) = &config.ort_lib_path {
            match ort::init_from(lib_path).commit() {
                Ok(_) => {},
                Err(e) => {
                    return Err(anyhow::anyhow!("Failed to commit ORT from {}: {:?}", lib_path, e));
                }
            };
        }

        let mut builder = Session::builder()?;

        let mut device = config.device;
        match device {
            InferenceDevice::CUDA(device_id) => {
                Self::build_cuda(&mut builder, device_id).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CPU => {
                Self::build_cpu(&mut builder)?;
            }
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&config.onnx_path)?;

        let in_dtypes = session
            .inputs
            .iter()
            .map(|input| input.input_type.tensor_type().unwrap_or(TensorElementType::Float32))
            .collect::<Vec<_>>();
        let in_shapes = session
            .inputs
            .iter()
            .map(|input| input.input_type.tensor_shape().map(|s| s.to_vec()).unwrap_or_default())
            .collect::<Vec<_>>();
        let out_names = session.outputs.iter().map(|o| o.name.clone()).collect::<Vec<_>>();
        let out_dtypes = session
            .outputs
            .iter()
            .map(|o| o.output_type.tensor_type().unwrap_or(TensorElementType::Float32))
            .collect::<Vec<_>>();

        let model_size = std::fs::metadata(&config.onnx_path).map(|m| m.len()).unwrap_or(0);
        log::info!(
            "Backend: ONNXRuntime | Device: {} | Model: {}B | Inputs: {:?} | Outputs: {:?}",
            device,
            human_bytes(model_size as f64),
            in_dtypes,
            out_names,
        );

        Ok(Self {
            session,
            device,
            in_dtypes,
            in_shapes,
            out_names,
            out_dtypes,
            infer_time: TimeCalc::default(),
        })
    }

    fn build_cuda(builder: &mut SessionBuilder, device_id: usize) -> Result<()> {
        let ep = CUDAExecutionProvider::default().with_device_id(device_id as i32);
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CUDA initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CUDA execution provider not available")
        }
    }

    fn build_cpu(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CPUExecutionProvider::default();
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CPU initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CPU execution provider not available")
        }
    }

    fn tensor_preprocess(x: &X, dtype: &TensorElementType) -> Result<DynValue> {
        let x = match dtype {
            TensorElementType::Float32 => Tensor::from_array(x.0.clone())?.into_dyn(),
            TensorElementType::Float64 => Tensor::from_array(x.mapv(|x_| x_ as f64))?.into_dyn(),
            TensorElementType::Float16 => Tensor::from_array(x.mapv(f16::from_f32))?.into_dyn(),
            TensorElementType::Bfloat16 => Tensor::from_array(x.mapv(bf16::from_f32))?.into_dyn(),
            TensorElementType::Int32 => Tensor::from_array(x.mapv(|x_| x_ as i32))?.into_dyn(),
            TensorElementType::Int64 => Tensor::from_array(x.mapv(|x_| x_ as i64))?.into_dyn(),
            TensorElementType::Uint8 => Tensor::from_array(x.mapv(|x_| x_.clamp(0., 255.) as u8))?.into_dyn(),
            _ => anyhow::bail!("Unsupported model input type: {:?}", dtype),
        };
        Ok(x)
    }

    fn tensor_postprocess(x: &DynValue, dtype: &TensorElementType) -> Result<Array<f32, IxDyn>> {
        fn _extract_and_convert<T>(x: &DynValue, map_fn: impl Fn(T) -> f32) -> Result<Array<f32, IxDyn>>
        where
            T: Clone + 'static + PrimitiveTensorElementType,
        {
            Ok(x.try_extract_array::<T>()?.mapv(map_fn))
        }
        match dtype {
            TensorElementType::Float32 => _extract_and_convert::<f32>(x, |x| x),
            TensorElementType::Float16 => _extract_and_convert::<f16>(x, f16::to_f32),
            TensorElementType::Bfloat16 => _extract_and_convert::<bf16>(x, bf16::to_f32),
            TensorElementType::Float64 => _extract_and_convert::<f64>(x, |x| x as f32),
            TensorElementType::Int64 => _extract_and_convert::<i64>(x, |x| x as f32),
            TensorElementType::Int32 => _extract_and_convert::<i32>(x, |x| x as f32),
            TensorElementType::Uint8 => _extract_and_convert::<u8>(x, |x| x as f32),
            _ => Err(anyhow::anyhow!("Unsupported ort tensor type: {:?}", dtype)),
        }
    }

    /// Runs the session; outputs are keyed by their graph names.
    pub fn engine_run(&mut self, xs: Xs) -> Result<Xs> {
        let t_pre = std::time::Instant::now();
        let mut xs_ = Vec::new();
        for (dtype, x) in self.in_dtypes.iter().zip(xs.iter()) {
            xs_.push(Into::<SessionInputValue<'_>>::into(Self::tensor_preprocess(x, dtype)?));
        }
        self.infer_time.add_or_push(0, t_pre.elapsed());

        let t_run = std::time::Instant::now();
        let outputs = self.session.run(&xs_[..])?;
        self.infer_time.add_or_push(1, t_run.elapsed());

        let t_post = std::time::Instant::now();
        let mut ys = Xs::new();
        for (dtype, name) in self.out_dtypes.iter().zip(self.out_names.iter()) {
            let y = Self::tensor_postprocess(&outputs[name.as_str()], dtype)?;
            ys.push_kv(name.as_str(), X::from(y))?;
        }
        self.infer_time.add_or_push(2, t_post.elapsed());

        Ok(ys)
    }

    /// Running per-stage averages of [`Self::engine_run`].
    pub fn timings(&self) -> String {
        self.infer_time.summary(&["pre", "run", "post"])
    }

    /// Reads a custom metadata entry, e.g. `names` in Ultralytics exports.
    pub fn try_fetch(&self, key: &str) -> Option<String> {
        match self.session.metadata() {
            Ok(metadata) => metadata.custom(key).ok().flatten(),
            Err(err) => {
                log::warn!("Failed to read model metadata: {err}");
                None
            }
        }
    }

    pub fn device(&self) -> &InferenceDevice {
        &self.device
    }

    pub fn in_dtypes(&self) -> &Vec<TensorElementType> {
        &self.in_dtypes
    }

    /// Declared shape of input `i`; dynamic axes are negative.
    pub fn in_shape(&self, i: usize) -> Option<&[i64]> {
        self.in_shapes.get(i).map(|s| s.as_slice())
    }

    pub fn out_names(&self) -> &Vec<String> {
        &self.out_names
    }
}
