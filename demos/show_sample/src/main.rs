use argh::FromArgs;
use std::path::PathBuf;

use bevlens_viz::{
    config::VizConfig,
    sample::SampleRecord,
    show::{show_bev_sample, show_result},
    sink::{ImageSink, NullSink, PngSink},
};

#[derive(FromArgs)]
/// Project the boxes and points of a detection sample onto its cameras
struct Args {
    /// path to the sample JSON file
    #[argh(option, short = 's')]
    sample: PathBuf,

    /// path to a visualization config JSON file
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// output directory, overrides the config
    #[argh(option, short = 'o')]
    out_dir: Option<PathBuf>,

    /// also export points and boxes as OBJ meshes
    #[argh(switch)]
    export_obj: bool,

    /// stream the results to a rerun viewer
    #[cfg(feature = "rerun")]
    #[argh(switch)]
    rerun: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();

    let mut config = match &args.config {
        Some(path) => VizConfig::from_json_file(path)?,
        None => VizConfig::default(),
    };
    if args.out_dir.is_some() {
        config.out_dir = args.out_dir.clone();
    }

    let sample = SampleRecord::from_json_file(&args.sample)?;
    log::info!(
        "sample {} with {} cameras",
        sample.sample_id(),
        sample.camera_names.len()
    );

    let sink: Box<dyn ImageSink> = match &config.out_dir {
        Some(dir) if config.show => Box::new(PngSink::new(dir.join("shown"))),
        _ => Box::new(NullSink),
    };
    #[cfg(feature = "rerun")]
    let sink: Box<dyn ImageSink> = if args.rerun {
        config.show = true;
        Box::new(bevlens_viz::sink::RerunSink::spawn("bevlens show_sample")?)
    } else {
        sink
    };
    let mut sink = sink;

    match show_bev_sample(&sample, &config, sink.as_mut())? {
        Some(mosaic) => log::info!("rendered mosaic of size {}", mosaic.size()),
        None => log::warn!("nothing to render for sample {}", sample.sample_id()),
    }

    if args.export_obj {
        let Some(out_dir) = &config.out_dir else {
            return Err("--export-obj needs an output directory".into());
        };
        let path = show_result(
            sample.points.as_ref(),
            sample.gt_boxes.as_ref(),
            sample.pred_boxes.as_ref(),
            out_dir,
            sample.sample_id(),
            &config,
            sink.as_mut(),
        )?;
        log::info!("exported meshes to {}", path.display());
    }

    Ok(())
}
