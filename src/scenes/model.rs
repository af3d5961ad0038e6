//! Lifecycle of the spinning model view.
//!
//! The stage loads the asset in the background, normalizes each freshly
//! arrived tree exactly once, and spins it a little on every frame. Nothing
//! from the model is shown until both the model and its reflection
//! environment have resolved.

use anyhow::Result;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::task::Poll;

use crate::animation::SpinAnimator;
use crate::frame::FrameInfo;
use crate::loaders::{load_environment, load_gltf, load_gltf_slice, EnvironmentMap, PendingLoad};
use crate::normalize::{AssetNormalizer, NormalizeReport};
use crate::scene::SceneNode;
use crate::traits::FrameHandler;

/// Where the model comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    File(PathBuf),
    /// glTF JSON with embedded buffers, or GLB bytes
    Memory(Arc<[u8]>),
}

impl ModelSource {
    pub fn load(&self) -> Result<SceneNode> {
        match self {
            ModelSource::File(path) => load_gltf(path),
            ModelSource::Memory(bytes) => load_gltf_slice(bytes),
        }
    }

    pub fn label(&self) -> String {
        match self {
            ModelSource::File(path) => path.display().to_string(),
            ModelSource::Memory(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

impl From<PathBuf> for ModelSource {
    fn from(path: PathBuf) -> Self {
        ModelSource::File(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    /// Not mounted, or mounted with nothing requested yet
    Idle,
    Loading,
    Ready { meshes: usize },
    Failed(String),
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageStatus::Idle => write!(f, "idle"),
            StageStatus::Loading => write!(f, "loading"),
            StageStatus::Ready { meshes } => write!(f, "loaded ({} meshes)", meshes),
            StageStatus::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}

pub struct ModelStage {
    source: ModelSource,
    environment_path: Option<PathBuf>,
    normalizer: AssetNormalizer,
    animator: SpinAnimator,

    mounted: bool,
    model_load: Option<PendingLoad<SceneNode>>,
    environment_load: Option<PendingLoad<EnvironmentMap>>,

    root: Option<SceneNode>,
    /// Mesh count of `root`, taken when it was installed
    meshes: usize,
    environment: Option<Arc<EnvironmentMap>>,
    status: StageStatus,

    generation: u64,
    normalized_generation: u64,
    last_report: Option<NormalizeReport>,
}

impl ModelStage {
    pub fn new(source: impl Into<ModelSource>, normalizer: AssetNormalizer, animator: SpinAnimator) -> Self {
        Self {
            source: source.into(),
            environment_path: None,
            normalizer,
            animator,
            mounted: false,
            model_load: None,
            environment_load: None,
            root: None,
            meshes: 0,
            environment: None,
            status: StageStatus::Idle,
            generation: 0,
            normalized_generation: 0,
            last_report: None,
        }
    }

    /// Reflection environment to load alongside the model
    pub fn with_environment(mut self, path: Option<PathBuf>) -> Self {
        self.environment_path = path;
        self
    }

    /// Start loading unless a load is already running or has finished
    pub fn mount(&mut self) {
        self.mounted = true;

        if self.environment.is_none() && self.environment_load.is_none() {
            if let Some(path) = self.environment_path.clone() {
                self.environment_load = spawn_load(path.display().to_string(), move || {
                    load_environment(&path)
                });
            }
        }

        if self.status == StageStatus::Idle && self.root.is_none() && self.model_load.is_none() {
            self.start_model_load();
        }
        self.refresh_status();
    }

    /// Drop pending work and the tracked model; later frames do nothing
    pub fn unmount(&mut self) {
        if self.mounted {
            log::debug!("Unmounting model stage for {}", self.source.label());
        }
        self.mounted = false;
        self.model_load = None;
        self.environment_load = None;
        self.root = None;
        self.animator.reset();
        self.status = StageStatus::Idle;
    }

    /// Swap in a different asset; the new tree is normalized once when it arrives
    pub fn replace_source(&mut self, source: impl Into<ModelSource>) {
        let source = source.into();
        log::info!("Model source changed: {} -> {}", self.source.label(), source.label());

        self.source = source;
        self.root = None;
        self.model_load = None;
        self.status = StageStatus::Idle;

        if self.mounted {
            self.start_model_load();
        }
        self.refresh_status();
    }

    /// Install a tree that is already in memory
    pub fn set_model(&mut self, root: SceneNode) {
        self.model_load = None;
        self.install(root);
        self.refresh_status();
    }

    /// Collect finished loads; call once per frame
    pub fn poll(&mut self) -> &StageStatus {
        if let Some(pending) = self.environment_load.as_mut() {
            if let Poll::Ready(result) = pending.poll() {
                let label = pending.label().to_string();
                self.environment_load = None;
                match result {
                    Ok(map) => self.environment = Some(Arc::new(map)),
                    Err(e) => log::warn!("Continuing without reflections, {} failed: {:#}", label, e),
                }
            }
        }

        if let Some(pending) = self.model_load.as_mut() {
            if let Poll::Ready(result) = pending.poll() {
                self.model_load = None;
                match result {
                    Ok(root) => self.install(root),
                    Err(e) => {
                        log::error!("Failed to load model {}: {:#}", self.source.label(), e);
                        self.status = StageStatus::Failed(format!("{:#}", e));
                    }
                }
            }
        }

        self.refresh_status();
        &self.status
    }

    pub fn status(&self) -> &StageStatus {
        &self.status
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status, StageStatus::Ready { .. })
    }

    /// The tracked model, once everything it needs has arrived
    pub fn root(&self) -> Option<&SceneNode> {
        self.root.as_ref().filter(|_| self.is_ready())
    }

    pub fn environment(&self) -> Option<&Arc<EnvironmentMap>> {
        self.environment.as_ref()
    }

    /// Number of trees installed so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_report(&self) -> Option<NormalizeReport> {
        self.last_report
    }

    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    pub fn animator(&self) -> &SpinAnimator {
        &self.animator
    }

    fn start_model_load(&mut self) {
        let source = self.source.clone();
        self.model_load = spawn_load(source.label(), move || source.load());
        if self.model_load.is_none() {
            self.status = StageStatus::Failed(format!("could not start loading {}", self.source.label()));
        }
    }

    fn install(&mut self, mut root: SceneNode) {
        self.generation += 1;

        if self.normalized_generation != self.generation {
            let report = self.normalizer.normalize_with_report(&mut root);
            log::info!(
                "Model ready: {} nodes, {} meshes, {} materials upgraded",
                report.visited,
                report.meshes,
                report.upgraded
            );
            self.normalized_generation = self.generation;
            self.last_report = Some(report);
        }

        self.meshes = root.mesh_count();
        self.root = Some(root);
        self.animator.reset();
        self.status = StageStatus::Idle;
    }

    fn refresh_status(&mut self) {
        if matches!(self.status, StageStatus::Failed(_)) {
            return;
        }

        self.status = if self.model_load.is_some() || self.environment_load.is_some() {
            StageStatus::Loading
        } else if self.root.is_some() {
            StageStatus::Ready { meshes: self.meshes }
        } else {
            StageStatus::Idle
        };
    }
}

impl FrameHandler for ModelStage {
    fn on_frame(&mut self, _frame: &FrameInfo) {
        let ready = self.is_ready();
        self.animator.on_frame(self.root.as_mut().filter(|_| ready));
    }
}

fn spawn_load<T, F>(label: String, load: F) -> Option<PendingLoad<T>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    log::info!("Loading {}", label);
    match PendingLoad::spawn(label, load) {
        Ok(pending) => Some(pending),
        Err(e) => {
            log::error!("{:#}", e);
            None
        }
    }
}
