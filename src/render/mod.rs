pub mod composite;
pub mod cpu;
pub mod damage;
pub mod optimizer;
pub mod paint;

use crate::foundation::error::{SceneError, SceneResult};

pub use cpu::{CpuPainter, FrameRGBA, PaintBackend, PaintPlan, StaticLayerOp};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Cpu,
}

impl std::str::FromStr for BackendKind {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            other => Err(SceneError::validation(format!(
                "requested backend '{other}' is not available"
            ))),
        }
    }
}

pub fn create_backend(kind: BackendKind) -> SceneResult<Box<dyn PaintBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(CpuPainter::new())),
    }
}
