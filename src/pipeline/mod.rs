//! Per-request coordination.
//!
//! Mirrors the three hooks a bundler plugin exposes:
//!
//! - [`ImagePipeline::directives`]: directive set for the raster engine
//! - [`ImagePipeline::load`]: early read of marked vector sources
//! - [`ImagePipeline::transform`]: rewrite of the module text produced so far
//!
//! plus [`ImagePipeline::process`], which drives the engine itself and hands
//! the typed descriptor straight to the generator.
//!
//! # Request lifecycle
//!
//! ```text
//! Unclaimed ──classify──► Raster | Vector ──resolve──► generate
//!     │
//!     └──► Ignored (pipeline disabled for this build mode)
//! ```
//!
//! Extensions are compared case-insensitively. Everything else, the marker,
//! directive keys and values, and file paths, is used as given.

mod error;

pub use error::PipelineError;

use std::path::Path;

use crate::config::PipelineConfig;
use crate::core::{AssetIdentifier, AssetKind, BuildMode, MARKER};
use crate::directive::{DirectiveResolver, DirectiveSet};
use crate::generator::{generate_raster, generate_vector, raster_module};
use crate::image::raster::{
    ImageEngine, OutputFormat, ProcessedVariant, RasterEngine, aggregate, check_variants,
};
use crate::image::svg::{PassConflict, SvgPipeline, build_pipeline};

/// How a request is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The pipeline is disabled for this build mode.
    Ignored,
    /// No marker, or an unsupported extension. Left to other handlers.
    Unclaimed,
    Raster,
    Vector,
}

impl Claim {
    pub fn kind(self) -> Option<AssetKind> {
        match self {
            Self::Raster => Some(AssetKind::Raster),
            Self::Vector => Some(AssetKind::Vector),
            Self::Ignored | Self::Unclaimed => None,
        }
    }
}

/// Result of the early load hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    pub code: String,
    /// Always `false`: generated modules can be tree-shaken.
    pub module_side_effects: bool,
}

/// A generated JSX module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    pub id: AssetIdentifier,
    pub kind: AssetKind,
    pub code: String,
}

/// Pipeline state shared read-only by every request.
pub struct ImagePipeline<E: RasterEngine = ImageEngine> {
    config: PipelineConfig,
    resolver: DirectiveResolver,
    svg: SvgPipeline,
    engine: E,
    mode: BuildMode,
}

impl ImagePipeline {
    /// Pipeline with the bundled engine writing into `[output].dir`.
    pub fn new(config: PipelineConfig, mode: BuildMode) -> Self {
        let engine = ImageEngine::new(&config.output);
        Self::with_engine(config, mode, engine)
    }
}

impl<E: RasterEngine> ImagePipeline<E> {
    pub fn with_engine(config: PipelineConfig, mode: BuildMode, engine: E) -> Self {
        Self {
            resolver: DirectiveResolver::from_config(&config.jsx_directives),
            svg: build_pipeline(&config.svgo),
            config,
            engine,
            mode,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.config.enabled.is_active(self.mode)
    }

    /// User plugin entries dropped from the vector pipeline.
    pub fn conflicts(&self) -> &[PassConflict] {
        self.svg.conflicts()
    }

    pub fn classify(&self, raw: &str) -> Claim {
        if !self.is_active() {
            return Claim::Ignored;
        }
        let id = AssetIdentifier::parse(raw);
        if !id.params.has(MARKER) {
            return Claim::Unclaimed;
        }
        let extension = id.extension();
        match AssetKind::from_extension(&extension) {
            Some(AssetKind::Raster) if self.engine.decodes(&extension) => Claim::Raster,
            Some(AssetKind::Raster) => Claim::Unclaimed,
            Some(AssetKind::Vector) => Claim::Vector,
            None => Claim::Unclaimed,
        }
    }

    /// Directives the raster engine should apply to `raw`. Empty when the
    /// request carries no marker or the pipeline is inactive.
    pub fn directives(&self, raw: &str) -> DirectiveSet {
        if !self.is_active() {
            return DirectiveSet::new();
        }
        self.resolver.resolve(&AssetIdentifier::parse(raw))
    }

    /// Read a marked vector source ahead of other loaders.
    pub async fn load(&self, raw: &str) -> Result<Option<LoadResult>, PipelineError> {
        if self.classify(raw) != Claim::Vector {
            return Ok(None);
        }
        let id = AssetIdentifier::parse(raw);
        let code = tokio::fs::read_to_string(&id.path)
            .await
            .map_err(|source| PipelineError::Io {
                path: id.path.clone().into(),
                source,
            })?;
        Ok(Some(LoadResult {
            code,
            module_side_effects: false,
        }))
    }

    /// Rewrite `code` for `raw`: engine module text for rasters, the vector
    /// source for SVGs. `None` when the request is not claimed.
    pub fn transform(&self, code: &str, raw: &str) -> Result<Option<String>, PipelineError> {
        match self.classify(raw) {
            Claim::Raster => generate_raster(code, raw).map(Some),
            Claim::Vector => self.vector_module(code, raw).map(Some),
            Claim::Ignored | Claim::Unclaimed => Ok(None),
        }
    }

    /// Run the whole request: engine or optimizer, then generation.
    pub async fn process(&self, raw: &str) -> Result<Option<GeneratedModule>, PipelineError> {
        let claim = self.classify(raw);
        let Some(kind) = claim.kind() else {
            return Ok(None);
        };

        let code = match kind {
            AssetKind::Raster => self.render_raster(raw).await?,
            AssetKind::Vector => match self.load(raw).await? {
                Some(loaded) => self.vector_module(&loaded.code, raw)?,
                None => return Ok(None),
            },
        };

        Ok(Some(GeneratedModule {
            id: AssetIdentifier::parse(raw),
            kind,
            code,
        }))
    }

    /// Engine request without the marker: the query is passed through as-is
    /// and the module is emitted in the `as` format (default `metadata`).
    pub async fn variants(&self, raw: &str) -> Result<String, PipelineError> {
        let id = AssetIdentifier::parse(raw);
        let directives: DirectiveSet = id.params.iter().collect();
        let format = directives
            .get("as")
            .and_then(OutputFormat::from_name)
            .unwrap_or(OutputFormat::Metadata);

        let variants = self.run_engine(&id, &directives).await?;
        Ok(format.reduce(&variants).emit_module())
    }

    async fn render_raster(&self, raw: &str) -> Result<String, PipelineError> {
        let id = AssetIdentifier::parse(raw);
        let directives = self.resolver.resolve(&id);
        let variants = self.run_engine(&id, &directives).await?;
        Ok(raster_module(&aggregate(&variants)))
    }

    async fn run_engine(
        &self,
        id: &AssetIdentifier,
        directives: &DirectiveSet,
    ) -> Result<Vec<ProcessedVariant>, PipelineError> {
        let engine_error = |source| PipelineError::Engine {
            id: id.raw.clone(),
            source,
        };
        let variants = self
            .engine
            .process(Path::new(&id.path), directives)
            .await
            .map_err(engine_error)?;
        check_variants(&variants).map_err(engine_error)?;
        Ok(variants)
    }

    fn vector_module(&self, source: &str, raw: &str) -> Result<String, PipelineError> {
        let id = AssetIdentifier::parse(raw);
        let optimized = self
            .svg
            .run(source, &id.path)
            .map_err(|source| PipelineError::MalformedVector {
                id: raw.to_string(),
                source,
            })?;
        Ok(generate_vector(&optimized.attributes))
    }
}
