use crate::command::buffer::BuiltinTarget;

/// Named insertion points in a camera's frame, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CameraEvent {
    /// Before the depth texture is generated.
    BeforeDepthTexture,
    /// After the depth texture is generated.
    AfterDepthTexture,
    /// Before the combined depth+normals texture is generated.
    BeforeDepthNormalsTexture,
    /// After the combined depth+normals texture is generated.
    AfterDepthNormalsTexture,
    /// Before opaque geometry is drawn.
    BeforeForwardOpaque,
    /// After opaque geometry is drawn.
    AfterForwardOpaque,
    /// Before the skybox fills the background.
    BeforeSkybox,
    /// After the skybox fills the background.
    AfterSkybox,
    /// Before transparent geometry is drawn.
    BeforeForwardAlpha,
    /// After transparent geometry is drawn.
    AfterForwardAlpha,
    /// Before image effects.
    BeforeImageEffects,
    /// After image effects.
    AfterImageEffects,
    /// After everything else in the frame.
    AfterEverything,
}

impl CameraEvent {
    /// Every event in execution order.
    pub const ALL: [CameraEvent; 13] = [
        Self::BeforeDepthTexture,
        Self::AfterDepthTexture,
        Self::BeforeDepthNormalsTexture,
        Self::AfterDepthNormalsTexture,
        Self::BeforeForwardOpaque,
        Self::AfterForwardOpaque,
        Self::BeforeSkybox,
        Self::AfterSkybox,
        Self::BeforeForwardAlpha,
        Self::AfterForwardAlpha,
        Self::BeforeImageEffects,
        Self::AfterImageEffects,
        Self::AfterEverything,
    ];

    /// Earliest event at which `target` holds this frame's contents.
    pub fn first_readable(target: BuiltinTarget) -> Self {
        match target {
            BuiltinTarget::Depth => Self::AfterDepthTexture,
            BuiltinTarget::DepthNormals => Self::AfterDepthNormalsTexture,
            BuiltinTarget::CameraTarget => Self::BeforeDepthTexture,
        }
    }
}

/// Work the host renderer performs between insertion points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderStage {
    /// Linear depth into the depth target.
    DepthTexture,
    /// Packed view normals and depth into the depth+normals target.
    DepthNormalsTexture,
    /// Opaque geometry into the camera target.
    ForwardOpaque,
    /// Background fill where no opaque geometry was drawn.
    Skybox,
    /// Transparent geometry blended over the camera target.
    ForwardAlpha,
    /// Host image effects slot. The CPU host draws nothing here.
    ImageEffects,
}

impl RenderStage {
    /// Stages in execution order.
    pub const ALL: [RenderStage; 6] = [
        Self::DepthTexture,
        Self::DepthNormalsTexture,
        Self::ForwardOpaque,
        Self::Skybox,
        Self::ForwardAlpha,
        Self::ImageEffects,
    ];

    /// Insertion point directly before this stage.
    pub fn before(self) -> CameraEvent {
        match self {
            Self::DepthTexture => CameraEvent::BeforeDepthTexture,
            Self::DepthNormalsTexture => CameraEvent::BeforeDepthNormalsTexture,
            Self::ForwardOpaque => CameraEvent::BeforeForwardOpaque,
            Self::Skybox => CameraEvent::BeforeSkybox,
            Self::ForwardAlpha => CameraEvent::BeforeForwardAlpha,
            Self::ImageEffects => CameraEvent::BeforeImageEffects,
        }
    }

    /// Insertion point directly after this stage.
    pub fn after(self) -> CameraEvent {
        match self {
            Self::DepthTexture => CameraEvent::AfterDepthTexture,
            Self::DepthNormalsTexture => CameraEvent::AfterDepthNormalsTexture,
            Self::ForwardOpaque => CameraEvent::AfterForwardOpaque,
            Self::Skybox => CameraEvent::AfterSkybox,
            Self::ForwardAlpha => CameraEvent::AfterForwardAlpha,
            Self::ImageEffects => CameraEvent::AfterImageEffects,
        }
    }
}

/// One entry of a [`FramePipeline`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStep {
    /// Run command buffers attached at this insertion point.
    Insertion(CameraEvent),
    /// Host renderer work.
    Stage(RenderStage),
}

/// Explicit ordered list of host stages and insertion points for one camera frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePipeline {
    steps: Vec<PipelineStep>,
}

impl Default for FramePipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl FramePipeline {
    /// Forward-rendering order: every stage wrapped by its before/after insertion points, then
    /// [`CameraEvent::AfterEverything`].
    pub fn standard() -> Self {
        let mut steps = Vec::with_capacity(RenderStage::ALL.len() * 3 + 1);
        for stage in RenderStage::ALL {
            steps.push(PipelineStep::Insertion(stage.before()));
            steps.push(PipelineStep::Stage(stage));
            steps.push(PipelineStep::Insertion(stage.after()));
        }
        steps.push(PipelineStep::Insertion(CameraEvent::AfterEverything));
        Self { steps }
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// Index of `event` in [`FramePipeline::steps`].
    pub fn position(&self, event: CameraEvent) -> Option<usize> {
        self.steps
            .iter()
            .position(|s| *s == PipelineStep::Insertion(event))
    }

    /// Index of `stage` in [`FramePipeline::steps`].
    pub fn stage_position(&self, stage: RenderStage) -> Option<usize> {
        self.steps
            .iter()
            .position(|s| *s == PipelineStep::Stage(stage))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/command/event.rs"]
mod tests;
