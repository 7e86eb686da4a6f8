use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use bevlens_3d::{
    boxes::{BoxMode, Boxes3d},
    io::obj::{write_boxes_obj, write_points_obj},
    pointcloud::PointCloud,
    projection::{ProjectionBounds, ProjectionMatrix},
};
use bevlens_image::Image;
use bevlens_imgproc::colormap::Colormap;
use bevlens_io::png::write_image_png_rgb8;

use crate::{
    annotate::{draw_label, draw_points, BoxPainter, BoxStyle, Palette},
    compositor::compose_mosaic,
    config::{BoxOverlay, Overlay, VizConfig},
    error::VizError,
    sample::{CameraView, SampleRecord},
    sink::ImageSink,
};

fn result_dir(out_dir: &Path, filename: &str) -> Result<PathBuf, VizError> {
    let path = out_dir.join(filename);
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

// split predictions by label so each class gets its own scene color
fn pred_groups(pred: &Boxes3d, style: &BoxStyle) -> Vec<(Boxes3d, [u8; 3])> {
    let Some(labels) = pred.labels() else {
        return vec![(pred.clone(), style.color)];
    };

    let mut by_label: BTreeMap<usize, Vec<_>> = BTreeMap::new();
    for (b, &label) in pred.boxes().iter().zip(labels) {
        by_label.entry(label).or_default().push(*b);
    }

    // hues are spread over the labels present, a palette is indexed by label
    let hues = Palette::from_hues(by_label.len());
    by_label
        .into_iter()
        .enumerate()
        .map(|(rank, (label, boxes))| {
            let color = match &style.palette {
                Some(palette) => palette.get(label),
                None => hues.get(rank),
            };
            let group = Boxes3d::new(boxes, pred.mode(), pred.origin());
            (group, color.unwrap_or(style.color))
        })
        .collect()
}

fn write_box_mesh(path: PathBuf, boxes: &Boxes3d) -> Result<(), VizError> {
    if boxes.mode() == BoxMode::Camera {
        log::warn!("no mesh export for camera-frame boxes, skipping {}", path.display());
        return Ok(());
    }
    write_boxes_obj(path, &boxes.clone().into_gravity_center())?;
    Ok(())
}

/// Export a detection result as OBJ files readable by mesh viewers.
///
/// Writes `<out_dir>/<filename>/<filename>_points.obj`, `_gt.obj` and `_pred.obj`; a missing
/// input skips its own file. Bottom-center boxes are moved to their gravity center before
/// export; camera-frame boxes have no mesh export and are skipped with a warning. When `config.show` is set, the scene is also sent to `sink`, predictions colored
/// by label.
///
/// # Returns
///
/// The directory holding the written files.
pub fn show_result(
    points: Option<&PointCloud>,
    gt_boxes: Option<&Boxes3d>,
    pred_boxes: Option<&Boxes3d>,
    out_dir: impl AsRef<Path>,
    filename: &str,
    config: &VizConfig,
    sink: &mut dyn ImageSink,
) -> Result<PathBuf, VizError> {
    let result_path = result_dir(out_dir.as_ref(), filename)?;

    if config.show {
        let mut scene: Vec<(Boxes3d, [u8; 3])> = Vec::new();
        if let Some(pred) = pred_boxes {
            scene.extend(pred_groups(pred, &config.pred));
        }
        if let Some(gt) = gt_boxes {
            scene.push((gt.clone(), config.gt.color));
        }
        let scene_refs: Vec<(&Boxes3d, [u8; 3])> = scene.iter().map(|(b, c)| (b, *c)).collect();
        sink.show_scene(filename, points, &scene_refs)?;
    }

    if let Some(points) = points {
        write_points_obj(result_path.join(format!("{filename}_points.obj")), points)?;
    }

    if let Some(gt) = gt_boxes {
        write_box_mesh(result_path.join(format!("{filename}_gt.obj")), gt)?;
    }

    if let Some(pred) = pred_boxes {
        write_box_mesh(result_path.join(format!("{filename}_pred.obj")), pred)?;
    }

    Ok(result_path)
}

fn colorize(cloud: &PointCloud, labels: &[usize], palette: &Palette) -> Result<PointCloud, VizError> {
    if labels.len() != cloud.len() {
        return Err(VizError::LabelCountMismatch(cloud.len(), labels.len()));
    }
    let colors = labels
        .iter()
        .map(|&l| palette.get(l).ok_or(VizError::LabelOutOfPalette(l, palette.len())))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PointCloud::new(cloud.points().to_vec(), Some(colors))?)
}

/// Export a point segmentation result as colored OBJ point files.
///
/// Points whose ground-truth label equals `ignore_index` are dropped from every output. The
/// files are `<filename>_points.obj` (the kept points), `_gt.obj` and `_pred.obj` (points
/// colored by label through `palette`).
///
/// # Errors
///
/// [`VizError::LabelCountMismatch`] when a label list does not match the points and
/// [`VizError::LabelOutOfPalette`] when a label has no color.
#[allow(clippy::too_many_arguments)]
pub fn show_seg_result(
    points: &PointCloud,
    gt_seg: Option<&[usize]>,
    pred_seg: Option<&[usize]>,
    out_dir: impl AsRef<Path>,
    filename: &str,
    palette: &Palette,
    ignore_index: Option<usize>,
    config: &VizConfig,
    sink: &mut dyn ImageSink,
) -> Result<PathBuf, VizError> {
    for seg in [gt_seg, pred_seg].into_iter().flatten() {
        if seg.len() != points.len() {
            return Err(VizError::LabelCountMismatch(points.len(), seg.len()));
        }
    }

    let (points, gt_seg, pred_seg) = match (gt_seg, ignore_index) {
        (Some(gt), Some(ignore)) => {
            let keep: Vec<bool> = gt.iter().map(|&l| l != ignore).collect();
            let pick = |seg: &[usize]| -> Vec<usize> {
                seg.iter()
                    .zip(&keep)
                    .filter(|(_, k)| **k)
                    .map(|(l, _)| *l)
                    .collect()
            };
            (points.select(&keep)?, Some(pick(gt)), pred_seg.map(pick))
        }
        _ => (
            points.clone(),
            gt_seg.map(<[usize]>::to_vec),
            pred_seg.map(<[usize]>::to_vec),
        ),
    };

    let gt_cloud = gt_seg
        .as_deref()
        .map(|l| colorize(&points, l, palette))
        .transpose()?;
    let pred_cloud = pred_seg
        .as_deref()
        .map(|l| colorize(&points, l, palette))
        .transpose()?;

    let result_path = result_dir(out_dir.as_ref(), filename)?;

    if config.show {
        sink.show_scene(&format!("{filename}/points"), Some(&points), &[])?;
        if let Some(cloud) = &gt_cloud {
            sink.show_scene(&format!("{filename}/gt"), Some(cloud), &[])?;
        }
        if let Some(cloud) = &pred_cloud {
            sink.show_scene(&format!("{filename}/pred"), Some(cloud), &[])?;
        }
    }

    write_points_obj(result_path.join(format!("{filename}_points.obj")), &points)?;
    if let Some(cloud) = &gt_cloud {
        write_points_obj(result_path.join(format!("{filename}_gt.obj")), cloud)?;
    }
    if let Some(cloud) = &pred_cloud {
        write_points_obj(result_path.join(format!("{filename}_pred.obj")), cloud)?;
    }

    Ok(result_path)
}

fn bounds_for(img: &Image<u8, 3>, config: &VizConfig) -> ProjectionBounds {
    ProjectionBounds::new(img.width(), img.height()).with_min_depth(config.min_depth)
}

// one box pass, honoring the overlay's score threshold
fn draw_box_pass(
    img: &mut Image<u8, 3>,
    boxes: &Boxes3d,
    overlay: &BoxOverlay,
    matrix: &ProjectionMatrix,
    style: &BoxStyle,
    config: &VizConfig,
) -> Result<usize, VizError> {
    let bounds = bounds_for(img, config);
    let painter = BoxPainter::new(config.box_mode);
    match overlay.min_score {
        Some(min_score) => painter.draw(
            img,
            &boxes.clone().filter_by_score(min_score),
            matrix,
            &bounds,
            style,
        ),
        None => painter.draw(img, boxes, matrix, &bounds, style),
    }
}

/// Inputs of one camera rendering.
struct Scene<'a> {
    points: Option<&'a PointCloud>,
    gt_boxes: Option<&'a Boxes3d>,
    pred_boxes: Option<&'a Boxes3d>,
    sample_id: &'a str,
    label_with_id: bool,
}

// run the configured overlays in order over a copy of the view image
fn render_camera_view(
    view: &CameraView,
    scene: &Scene,
    config: &VizConfig,
    cmap: &Colormap,
) -> Result<Image<u8, 3>, VizError> {
    let mut img = view.image.clone();

    for overlay in &config.overlays {
        match overlay {
            Overlay::GtBoxes(o) => {
                if let Some(gt) = scene.gt_boxes {
                    draw_box_pass(&mut img, gt, o, &view.projection, &config.gt, config)?;
                }
            }
            Overlay::PredBoxes(o) => {
                if let Some(pred) = scene.pred_boxes {
                    draw_box_pass(&mut img, pred, o, &view.projection, &config.pred, config)?;
                }
            }
            Overlay::Points(o) => {
                if let (Some(points), true) = (scene.points, o.applies_to(&view.name)) {
                    let bounds = bounds_for(&img, config);
                    let drawn =
                        draw_points(&mut img, points, &view.projection, &bounds, &config.points, cmap);
                    log::debug!("{}: drew {drawn} of {} points", view.name, points.len());
                }
            }
            Overlay::CameraLabel(o) => {
                let text = if o.with_sample_id.unwrap_or(scene.label_with_id) {
                    format!("{}_{}", view.name, scene.sample_id)
                } else {
                    view.name.clone()
                };
                draw_label(&mut img, &text, &config.label);
            }
        }
    }

    Ok(img)
}

/// Project 3D boxes onto one camera image and save the results.
///
/// Writes `<filename>_img.png` (the input), `<filename>_gt.png` and `<filename>_pred.png`
/// (one box set each) under `<out_dir>/<filename>/`. When `config.show` is set, the image
/// with both box sets is sent to `sink`.
#[allow(clippy::too_many_arguments)]
pub fn show_multi_modality_result(
    img: &Image<u8, 3>,
    gt_boxes: Option<&Boxes3d>,
    pred_boxes: Option<&Boxes3d>,
    matrix: &ProjectionMatrix,
    out_dir: impl AsRef<Path>,
    filename: &str,
    config: &VizConfig,
    sink: &mut dyn ImageSink,
) -> Result<PathBuf, VizError> {
    let result_path = result_dir(out_dir.as_ref(), filename)?;
    let all = BoxOverlay::default();

    if config.show {
        let mut overlay = img.clone();
        if let Some(gt) = gt_boxes {
            draw_box_pass(&mut overlay, gt, &all, matrix, &config.gt, config)?;
        }
        if let Some(pred) = pred_boxes {
            draw_box_pass(&mut overlay, pred, &all, matrix, &config.pred, config)?;
        }
        sink.show(filename, &overlay)?;
    }

    write_image_png_rgb8(result_path.join(format!("{filename}_img.png")), img)?;

    for (boxes, style, suffix) in [
        (gt_boxes, &config.gt, "gt"),
        (pred_boxes, &config.pred, "pred"),
    ] {
        let Some(boxes) = boxes else {
            continue;
        };
        let mut drawn = img.clone();
        draw_box_pass(&mut drawn, boxes, &all, matrix, style, config)?;
        write_image_png_rgb8(result_path.join(format!("{filename}_{suffix}.png")), &drawn)?;
    }

    Ok(result_path)
}

/// Render every camera of a sample and assemble the mosaic.
///
/// Each camera `<cam>` gets `<sample>_<cam>_img.png`, `_gt.png` and `_pred.png` under
/// `<out_dir>/<sample>_<cam>/`; the annotated views (overlays from `config`, labeled with the
/// camera name) are composed with `config.layout` and saved as
/// `<out_dir>/<sample>_mosaic.png`. When `config.show` is set the mosaic is also sent to
/// `sink`.
///
/// # Returns
///
/// The mosaic image.
#[allow(clippy::too_many_arguments)]
pub fn show_multi_cam_result(
    views: &[CameraView],
    points: Option<&PointCloud>,
    gt_boxes: Option<&Boxes3d>,
    pred_boxes: Option<&Boxes3d>,
    out_dir: impl AsRef<Path>,
    sample_name: &str,
    config: &VizConfig,
    sink: &mut dyn ImageSink,
) -> Result<Image<u8, 3>, VizError> {
    let out_dir = out_dir.as_ref();
    let cmap = Colormap::hsv();
    let scene = Scene {
        points,
        gt_boxes,
        pred_boxes,
        sample_id: sample_name,
        label_with_id: false,
    };

    let mut rendered = Vec::with_capacity(views.len());
    for view in views {
        let filename = format!("{sample_name}_{}", view.name);
        show_multi_modality_result(
            &view.image,
            gt_boxes,
            pred_boxes,
            &view.projection,
            out_dir,
            &filename,
            &VizConfig {
                show: false,
                ..config.clone()
            },
            sink,
        )?;
        rendered.push(render_camera_view(view, &scene, config, &cmap)?);
        log::debug!("rendered camera {}", view.name);
    }

    let named: Vec<(&str, &Image<u8, 3>)> = views
        .iter()
        .zip(&rendered)
        .map(|(v, img)| (v.name.as_str(), img))
        .collect();
    let mosaic = compose_mosaic(&named, &config.layout.build())?;

    write_image_png_rgb8(out_dir.join(format!("{sample_name}_mosaic.png")), &mosaic)?;
    if config.show {
        sink.show(&format!("{sample_name}_mosaic"), &mosaic)?;
    }

    Ok(mosaic)
}

/// Render a BEVDet-format sample: boxes and points projected onto every camera through the
/// transforms composed from `img_inputs`, each view labeled `<camera>_<sample id>`.
///
/// The mosaic is written to `<config.out_dir>/<sample id>_mosaic.png` when an output
/// directory is configured, and sent to `sink` when `config.show` is set.
///
/// # Returns
///
/// The mosaic, or `None` when the sample has no renderable camera.
pub fn show_bev_sample(
    sample: &SampleRecord,
    config: &VizConfig,
    sink: &mut dyn ImageSink,
) -> Result<Option<Image<u8, 3>>, VizError> {
    let views = sample.camera_views()?;
    if views.is_empty() {
        log::warn!("sample {} has no camera to render", sample.sample_idx);
        return Ok(None);
    }

    let cmap = Colormap::hsv();
    let scene = Scene {
        points: sample.points.as_ref(),
        gt_boxes: sample.gt_boxes.as_ref(),
        pred_boxes: sample.pred_boxes.as_ref(),
        sample_id: sample.sample_id(),
        label_with_id: true,
    };

    let rendered = views
        .iter()
        .map(|view| render_camera_view(view, &scene, config, &cmap))
        .collect::<Result<Vec<_>, _>>()?;

    let named: Vec<(&str, &Image<u8, 3>)> = views
        .iter()
        .zip(&rendered)
        .map(|(v, img)| (v.name.as_str(), img))
        .collect();
    let mosaic = compose_mosaic(&named, &config.layout.build())?;

    if let Some(out_dir) = &config.out_dir {
        write_image_png_rgb8(
            out_dir.join(format!("{}_mosaic.png", sample.sample_id())),
            &mosaic,
        )?;
    }
    if config.show {
        sink.show(&format!("{}_mosaic", sample.sample_id()), &mosaic)?;
    }

    Ok(Some(mosaic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        annotate::{GT_COLOR, PRED_COLOR},
        sink::NullSink,
    };
    use bevlens_3d::{
        boxes::{Box3d, BoxMode, BoxOrigin},
        transforms::{compose_lidar_to_image, Extrinsic, Intrinsic},
    };
    use bevlens_image::ImageSize;

    #[derive(Default)]
    struct RecordingSink {
        images: Vec<String>,
        scenes: Vec<(String, usize)>,
    }

    impl ImageSink for RecordingSink {
        fn show(&mut self, name: &str, _image: &Image<u8, 3>) -> Result<(), VizError> {
            self.images.push(name.to_string());
            Ok(())
        }

        fn show_scene(
            &mut self,
            name: &str,
            _points: Option<&PointCloud>,
            boxes: &[(&Boxes3d, [u8; 3])],
        ) -> Result<(), VizError> {
            self.scenes.push((name.to_string(), boxes.len()));
            Ok(())
        }
    }

    fn forward_view(name: &str) -> CameraView {
        CameraView {
            name: name.to_string(),
            image: Image::from_size_val(
                ImageSize {
                    width: 100,
                    height: 100,
                },
                0,
            )
            .unwrap(),
            projection: compose_lidar_to_image(
                &Extrinsic::new([[0.0, -1.0, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0, 0.0]], [0.0; 3]),
                &Intrinsic::from_pinhole(50.0, 50.0, 50.0, 50.0),
                None,
                None,
            )
            .unwrap(),
        }
    }

    fn car() -> Boxes3d {
        Boxes3d::new(
            vec![Box3d::new([10.0, 0.0, -1.0], [2.0, 2.0, 2.0], 0.0)],
            BoxMode::Lidar,
            BoxOrigin::BottomCenter,
        )
    }

    #[test]
    fn test_show_result_files() -> Result<(), VizError> {
        let tmp_dir = tempfile::tempdir()?;
        let cloud = PointCloud::new(vec![[1.0, 2.0, 3.0]], None)?;
        let gt = Boxes3d::new(
            vec![Box3d::new([0.0, 0.0, 0.0], [1.0, 1.0, 2.0], 0.0)],
            BoxMode::Lidar,
            BoxOrigin::BottomCenter,
        );

        let path = show_result(
            Some(&cloud),
            Some(&gt),
            None,
            tmp_dir.path(),
            "000001",
            &VizConfig::default(),
            &mut NullSink,
        )?;

        assert_eq!(path, tmp_dir.path().join("000001"));
        let points = std::fs::read_to_string(path.join("000001_points.obj"))?;
        assert_eq!(points, "v 1.000000 2.000000 3.000000\n");
        assert!(path.join("000001_gt.obj").exists());
        assert!(!path.join("000001_pred.obj").exists());

        // gravity center at z = 1, so the mesh spans z in [0, 2]
        let gt_obj = std::fs::read_to_string(path.join("000001_gt.obj"))?;
        let zs: Vec<f64> = gt_obj
            .lines()
            .filter(|l| l.starts_with("v "))
            .filter_map(|l| l.split_whitespace().nth(3)?.parse().ok())
            .collect();
        assert_eq!(zs.len(), 8);
        assert!(zs.iter().all(|&z| z == 0.0 || z == 2.0));
        Ok(())
    }

    #[test]
    fn test_show_result_scene_by_label() -> Result<(), VizError> {
        let tmp_dir = tempfile::tempdir()?;
        let pred = Boxes3d::new(
            vec![Box3d::default(), Box3d::default(), Box3d::default()],
            BoxMode::Lidar,
            BoxOrigin::BottomCenter,
        )
        .with_labels(vec![0, 2, 0])?;
        let config = VizConfig {
            show: true,
            ..Default::default()
        };
        let mut sink = RecordingSink::default();

        show_result(None, Some(&car()), Some(&pred), tmp_dir.path(), "s", &config, &mut sink)?;

        // labels 0 and 2 plus the gt set
        assert_eq!(sink.scenes, vec![("s".to_string(), 3)]);
        Ok(())
    }

    #[test]
    fn test_pred_groups_sparse_labels() -> Result<(), VizError> {
        let pred = Boxes3d::new(
            vec![Box3d::default(), Box3d::default(), Box3d::default()],
            BoxMode::Lidar,
            BoxOrigin::BottomCenter,
        )
        .with_labels(vec![0, usize::MAX / 2, 0])?;

        let groups = pred_groups(&pred, &BoxStyle::prediction());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0.len(), 2);
        assert_eq!(groups[1].0.len(), 1);
        let hues = Palette::from_hues(2);
        assert_eq!(Some(groups[0].1), hues.get(0));
        assert_eq!(Some(groups[1].1), hues.get(1));

        // an explicit palette is indexed by label, misses fall back to the style color
        let style = BoxStyle {
            palette: Some(Palette::new(vec![[1, 2, 3]])),
            ..BoxStyle::prediction()
        };
        let groups = pred_groups(&pred, &style);
        assert_eq!(groups[0].1, [1, 2, 3]);
        assert_eq!(groups[1].1, PRED_COLOR);

        let tmp_dir = tempfile::tempdir()?;
        let config = VizConfig {
            show: true,
            ..Default::default()
        };
        let mut sink = RecordingSink::default();
        show_result(None, Some(&car()), Some(&pred), tmp_dir.path(), "s", &config, &mut sink)?;
        assert_eq!(sink.scenes, vec![("s".to_string(), 3)]);
        Ok(())
    }

    #[test]
    fn test_show_result_camera_boxes() -> Result<(), VizError> {
        let tmp_dir = tempfile::tempdir()?;
        let cloud = PointCloud::new(vec![[1.0, 2.0, 3.0]], None)?;
        let gt = Boxes3d::new(
            vec![Box3d::new([0.0, 1.0, 10.0], [2.0, 1.5, 4.0], 0.0)],
            BoxMode::Camera,
            BoxOrigin::BottomCenter,
        );

        let path = show_result(
            Some(&cloud),
            Some(&gt),
            Some(&car()),
            tmp_dir.path(),
            "cam",
            &VizConfig::default(),
            &mut NullSink,
        )?;
        assert!(path.join("cam_points.obj").exists());
        assert!(!path.join("cam_gt.obj").exists());
        assert!(path.join("cam_pred.obj").exists());
        Ok(())
    }

    #[test]
    fn test_show_seg_result_ignore() -> Result<(), VizError> {
        let tmp_dir = tempfile::tempdir()?;
        let cloud = PointCloud::new(vec![[0.0; 3], [1.0; 3], [2.0; 3]], None)?;
        let palette = Palette::new(vec![[10, 20, 30], [40, 50, 60]]);

        let path = show_seg_result(
            &cloud,
            Some(&[0, 9, 1][..]),
            Some(&[1, 1, 0][..]),
            tmp_dir.path(),
            "seg",
            &palette,
            Some(9),
            &VizConfig::default(),
            &mut NullSink,
        )?;

        let gt = std::fs::read_to_string(path.join("seg_gt.obj"))?;
        assert_eq!(
            gt,
            "v 0.000000 0.000000 0.000000 10 20 30\nv 2.000000 2.000000 2.000000 40 50 60\n"
        );
        let pred = std::fs::read_to_string(path.join("seg_pred.obj"))?;
        assert!(pred.starts_with("v 0.000000 0.000000 0.000000 40 50 60\n"));
        assert_eq!(std::fs::read_to_string(path.join("seg_points.obj"))?.lines().count(), 2);
        Ok(())
    }

    #[test]
    fn test_show_seg_result_errors() -> Result<(), VizError> {
        let tmp_dir = tempfile::tempdir()?;
        let cloud = PointCloud::new(vec![[0.0; 3], [1.0; 3]], None)?;
        let palette = Palette::new(vec![[10, 20, 30]]);

        let res = show_seg_result(
            &cloud,
            Some(&[0, 5][..]),
            None,
            tmp_dir.path(),
            "seg",
            &palette,
            None,
            &VizConfig::default(),
            &mut NullSink,
        );
        assert!(matches!(res, Err(VizError::LabelOutOfPalette(5, 1))));

        let res = show_seg_result(
            &cloud,
            Some(&[0][..]),
            None,
            tmp_dir.path(),
            "seg",
            &palette,
            None,
            &VizConfig::default(),
            &mut NullSink,
        );
        assert!(matches!(res, Err(VizError::LabelCountMismatch(2, 1))));
        Ok(())
    }

    #[test]
    fn test_show_multi_modality_result() -> Result<(), VizError> {
        let tmp_dir = tempfile::tempdir()?;
        let view = forward_view("cam");
        let config = VizConfig {
            show: true,
            ..Default::default()
        };
        let mut sink = RecordingSink::default();

        let path = show_multi_modality_result(
            &view.image,
            Some(&car()),
            None,
            &view.projection,
            tmp_dir.path(),
            "frame",
            &config,
            &mut sink,
        )?;

        let input = bevlens_io::png::read_image_png_rgb8(path.join("frame_img.png"))?;
        assert!(input.as_slice().iter().all(|&v| v == 0));
        let gt = bevlens_io::png::read_image_png_rgb8(path.join("frame_gt.png"))?;
        assert!(gt.as_slice().chunks_exact(3).any(|p| p == GT_COLOR));
        assert!(!path.join("frame_pred.png").exists());
        assert_eq!(sink.images, vec!["frame".to_string()]);
        Ok(())
    }

    #[test]
    fn test_render_overlays_in_order() -> Result<(), VizError> {
        let view = forward_view("front_left_camera");
        let cloud = PointCloud::new(vec![[5.0, 0.0, 0.0]], None)?;
        let scene = Scene {
            points: Some(&cloud),
            gt_boxes: None,
            pred_boxes: None,
            sample_id: "000001",
            label_with_id: true,
        };
        let cmap = Colormap::hsv();

        let only_other_camera = VizConfig {
            overlays: vec![Overlay::Points(crate::config::PointOverlay {
                cameras: Some(vec!["side_left_camera".to_string()]),
            })],
            ..Default::default()
        };
        let img = render_camera_view(&view, &scene, &only_other_camera, &cmap)?;
        assert!(img.as_slice().iter().all(|&v| v == 0));

        let points_only = VizConfig {
            overlays: vec![Overlay::Points(Default::default())],
            ..Default::default()
        };
        let img = render_camera_view(&view, &scene, &points_only, &cmap)?;
        assert_eq!(img.pixel(50, 50)?, &cmap.depth_color(5.0));
        Ok(())
    }

    #[test]
    fn test_show_multi_cam_result() -> Result<(), VizError> {
        let tmp_dir = tempfile::tempdir()?;
        let views = vec![forward_view("front_left_camera"), forward_view("front_right_camera")];

        let mosaic = show_multi_cam_result(
            &views,
            None,
            Some(&car()),
            None,
            tmp_dir.path(),
            "000003",
            &VizConfig::default(),
            &mut NullSink,
        )?;

        // the empty side row keeps the default height
        assert_eq!(mosaic.width(), 200);
        assert_eq!(mosaic.height(), 100 + 540);
        assert!(tmp_dir.path().join("000003_mosaic.png").exists());
        assert!(tmp_dir
            .path()
            .join("000003_front_left_camera")
            .join("000003_front_left_camera_gt.png")
            .exists());
        Ok(())
    }
}
