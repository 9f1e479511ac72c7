//! JSON filter presets.
//!
//! A preset names one filter and its parameters, e.g.
//! `{"filter": "stpresso", "limit": 4, "tthr": 0}`. Missing parameters take the filter defaults,
//! unknown ones are rejected.

use std::path::Path;

use crate::filters::masks::{MwlMaskParams, mwlmask};
use crate::filters::motion::{FluxSmoothParams, MotionParams, MvFrcParams, fluxsmooth_tmc, mvfrc};
use crate::filters::planes::{MorphParams, ShowPlane, expand, inpand, show_plane};
use crate::filters::pressdown::{SpressoParams, StpressoParams, spresso, stpresso, stpresso_mc};
use crate::filters::sharpen::{
    NonlinUsmParams, SharpenDetailParams, UsmBlur, UsmParams, nonlin_usm, sharpen_detail, xs_usm,
};
use crate::foundation::error::{XvsError, XvsResult};
use crate::graph::core::Core;
use crate::graph::node::NodeId;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "filter", rename_all = "snake_case")]
pub enum FilterPreset {
    Stpresso(StpressoParams),
    StpressoMc {
        #[serde(default)]
        pressdown: StpressoParams,
        #[serde(default)]
        motion: MotionParams,
    },
    Spresso(SpressoParams),
    FluxsmoothTmc(FluxSmoothParams),
    Mvfrc(MvFrcParams),
    XsUsm(UsmParams),
    SharpenDetail(SharpenDetailParams),
    NonlinUsm(NonlinUsmParams),
    Mwlmask(MwlMaskParams),
    Inpand(MorphParams),
    Expand(MorphParams),
    ShowPlane { plane: ShowPlane },
}

impl FilterPreset {
    pub fn from_json(text: &str) -> XvsResult<Self> {
        let preset: Self = serde_json::from_str(text)?;
        if let Self::XsUsm(UsmParams {
            blur: UsmBlur::Clip(_),
            ..
        }) = &preset
        {
            return Err(XvsError::validation(
                "xs_usm presets cannot reference a blur clip",
            ));
        }
        Ok(preset)
    }

    pub fn load(path: &Path) -> XvsResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Stpresso(_) => "stpresso",
            Self::StpressoMc { .. } => "stpresso_mc",
            Self::Spresso(_) => "spresso",
            Self::FluxsmoothTmc(_) => "fluxsmooth_tmc",
            Self::Mvfrc(_) => "mvfrc",
            Self::XsUsm(_) => "xs_usm",
            Self::SharpenDetail(_) => "sharpen_detail",
            Self::NonlinUsm(_) => "nonlin_usm",
            Self::Mwlmask(_) => "mwlmask",
            Self::Inpand(_) => "inpand",
            Self::Expand(_) => "expand",
            Self::ShowPlane { .. } => "show_plane",
        }
    }

    /// Build the preset's filter over `clip`.
    #[tracing::instrument(skip(self, core), fields(filter = self.name()))]
    pub fn build(&self, core: &mut Core, clip: NodeId) -> XvsResult<NodeId> {
        match self {
            Self::Stpresso(p) => stpresso(core, clip, p),
            Self::StpressoMc { pressdown, motion } => stpresso_mc(core, clip, pressdown, motion),
            Self::Spresso(p) => spresso(core, clip, p),
            Self::FluxsmoothTmc(p) => fluxsmooth_tmc(core, clip, p),
            Self::Mvfrc(p) => mvfrc(core, clip, p),
            Self::XsUsm(p) => xs_usm(core, clip, p, None),
            Self::SharpenDetail(p) => sharpen_detail(core, clip, p),
            Self::NonlinUsm(p) => nonlin_usm(core, clip, p, None),
            Self::Mwlmask(p) => mwlmask(core, clip, p),
            Self::Inpand(p) => inpand(core, clip, p),
            Self::Expand(p) => expand(core, clip, p),
            Self::ShowPlane { plane } => show_plane(core, clip, *plane),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
