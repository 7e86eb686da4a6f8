use std::path::PathBuf;

use bevlens_3d::{boxes::Boxes3d, pointcloud::PointCloud};
use bevlens_image::Image;
use bevlens_io::png::write_image_png_rgb8;

use crate::error::VizError;

/// A destination for rendered results.
pub trait ImageSink {
    /// Display or store an RGB image under `name`.
    fn show(&mut self, name: &str, image: &Image<u8, 3>) -> Result<(), VizError>;

    /// Display a 3D scene of points and box sets, each set with its own color.
    ///
    /// Sinks without a 3D view ignore the scene.
    fn show_scene(
        &mut self,
        _name: &str,
        _points: Option<&PointCloud>,
        _boxes: &[(&Boxes3d, [u8; 3])],
    ) -> Result<(), VizError> {
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ImageSink for NullSink {
    fn show(&mut self, _name: &str, _image: &Image<u8, 3>) -> Result<(), VizError> {
        Ok(())
    }
}

/// Writes every shown image to `<dir>/<name>.png`.
#[derive(Debug, Clone)]
pub struct PngSink {
    dir: PathBuf,
}

impl PngSink {
    /// Create a sink writing into `dir`, created on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The output directory.
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

impl ImageSink for PngSink {
    fn show(&mut self, name: &str, image: &Image<u8, 3>) -> Result<(), VizError> {
        let path = self.dir.join(format!("{name}.png"));
        write_image_png_rgb8(&path, image)?;
        log::info!("saved {}", path.display());
        Ok(())
    }
}

/// Logs images, points and box wireframes to a rerun viewer or recording.
#[cfg(feature = "rerun")]
pub struct RerunSink {
    rec: rerun::RecordingStream,
}

#[cfg(feature = "rerun")]
impl RerunSink {
    /// Spawn a viewer and stream to it.
    pub fn spawn(app_id: &str) -> Result<Self, VizError> {
        let rec = rerun::RecordingStreamBuilder::new(app_id)
            .spawn()
            .map_err(|e| VizError::Sink(e.to_string()))?;
        Ok(Self { rec })
    }

    /// Record into an `.rrd` file.
    pub fn save(app_id: &str, path: impl AsRef<std::path::Path>) -> Result<Self, VizError> {
        let rec = rerun::RecordingStreamBuilder::new(app_id)
            .save(path.as_ref())
            .map_err(|e| VizError::Sink(e.to_string()))?;
        Ok(Self { rec })
    }
}

#[cfg(feature = "rerun")]
impl ImageSink for RerunSink {
    fn show(&mut self, name: &str, image: &Image<u8, 3>) -> Result<(), VizError> {
        self.rec
            .log(
                name,
                &rerun::Image::from_elements(
                    image.as_slice(),
                    image.size().into(),
                    rerun::ColorModel::RGB,
                ),
            )
            .map_err(|e| VizError::Sink(e.to_string()))
    }

    fn show_scene(
        &mut self,
        name: &str,
        points: Option<&PointCloud>,
        boxes: &[(&Boxes3d, [u8; 3])],
    ) -> Result<(), VizError> {
        if let Some(cloud) = points {
            let positions = cloud
                .points()
                .iter()
                .map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
                .collect::<Vec<_>>();
            let colors = cloud.colors().map_or(vec![], |colors| {
                colors
                    .iter()
                    .map(|c| rerun::Color::from_rgb(c[0], c[1], c[2]))
                    .collect()
            });
            self.rec
                .log(
                    format!("{name}/points"),
                    &rerun::Points3D::new(positions).with_colors(colors),
                )
                .map_err(|e| VizError::Sink(e.to_string()))?;
        }

        for (i, (set, color)) in boxes.iter().enumerate() {
            let strips = set
                .corners()
                .iter()
                .flat_map(|corners| {
                    bevlens_3d::boxes::BOX_EDGES.iter().map(move |&(a, b)| {
                        [corners[a], corners[b]].map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
                    })
                })
                .collect::<Vec<_>>();
            self.rec
                .log(
                    format!("{name}/boxes_{i}"),
                    &rerun::LineStrips3D::new(strips)
                        .with_colors([rerun::Color::from_rgb(color[0], color[1], color[2])]),
                )
                .map_err(|e| VizError::Sink(e.to_string()))?;
        }

        Ok(())
    }
}
