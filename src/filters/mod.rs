//! Filter builders. Each one validates its parameters and input format, then records its host
//! calls into a [`crate::Core`] and returns the output node.

pub(crate) mod masks;
pub(crate) mod motion;
pub(crate) mod planes;
pub(crate) mod pressdown;
pub(crate) mod sharpen;
pub(crate) mod splice;

use crate::foundation::error::{XvsError, XvsResult};
use crate::foundation::format::{ColorFamily, VideoFormat};

const ALL_PLANES: [usize; 3] = [0, 1, 2];

fn require_family(
    format: &VideoFormat,
    filter: &str,
    allowed: &[ColorFamily],
) -> XvsResult<()> {
    if allowed.contains(&format.color_family) {
        return Ok(());
    }
    let names: Vec<String> = allowed.iter().map(|f| format!("{f:?}")).collect();
    Err(XvsError::validation(format!(
        "{filter}: only supports {} clips, got {:?}",
        names.join("/"),
        format.color_family
    )))
}

fn check_plane_list(format: &VideoFormat, filter: &str, planes: &[usize]) -> XvsResult<()> {
    if planes.is_empty() {
        return Err(XvsError::validation(format!("{filter}: no planes selected")));
    }
    if let Some(&p) = planes.iter().find(|&&p| p >= format.num_planes()) {
        return Err(XvsError::validation(format!(
            "{filter}: plane {p} does not exist in a {}-plane clip",
            format.num_planes()
        )));
    }
    Ok(())
}
