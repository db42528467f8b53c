mod opt;

use std::path::Path;

use crate::opt::{AnalysisKind, Opt};

use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::Env;
use evan::{
    analyses::{atlas_ccdy, atlas_ww, atlas_wz, cms_ww, drell_yan, AnalysisError},
    analysis::EventAnalysis,
    combine::Normalisation,
    config::AnalysisConfig,
    event::Event,
    event_loop::EventLoop,
    output::write_json,
    run::run_samples,
    traits::Select,
    GIT_BRANCH, GIT_REV, VERSION,
};
use log::{debug, info};

fn main() -> Result<()> {
    let args = argfile::expand_args_from(
        std::env::args_os(),
        argfile::parse_fromfile,
        argfile::PREFIX,
    )
    .with_context(|| "Failed to read argument file")?;
    let opt = Opt::parse_from(args);

    let env = Env::default().filter_or("EVAN_LOG", &opt.loglevel);
    env_logger::init_from_env(env);

    if let (Some(rev), Some(branch)) = (GIT_REV, GIT_BRANCH) {
        info!("evan {VERSION} rev {rev} ({branch})");
    } else {
        info!("evan {VERSION}");
    }

    debug!("settings: {:#?}", opt);

    let config = AnalysisConfig::from_file(&opt.config).with_context(|| {
        format!("Failed to load configuration from {:?}", opt.config)
    })?;
    debug!("configuration: {:#?}", config);
    let output = opt.output.as_deref().unwrap_or(&config.output);

    info!("Running {} analysis", opt.analysis);
    let resolve = |default| {
        opt.normalisation.or(config.normalisation).unwrap_or(default)
    };
    if !config.weights.is_empty() && opt.analysis != AnalysisKind::Ccdy {
        bail!("Named weights are only supported by the ccdy analysis");
    }
    match opt.analysis {
        AnalysisKind::Wz => {
            let normalisation = resolve(atlas_wz::NORMALISATION);
            let event_loop = EventLoop::new(atlas_wz::histogram(normalisation)?);
            run(&config, normalisation, event_loop, atlas_wz::analysis(), output)
        }
        AnalysisKind::Ww => {
            let normalisation = resolve(atlas_ww::NORMALISATION);
            let event_loop = EventLoop::new(atlas_ww::histogram(normalisation)?);
            run(&config, normalisation, event_loop, atlas_ww::analysis(), output)
        }
        AnalysisKind::Dy => {
            let normalisation = resolve(drell_yan::MASS_NORMALISATION);
            let event_loop =
                EventLoop::new(drell_yan::mass_histogram(normalisation)?);
            run(
                &config,
                normalisation,
                event_loop,
                drell_yan::mass_analysis(),
                output,
            )
        }
        AnalysisKind::Ccdy => {
            let normalisation =
                resolve(drell_yan::CHARGED_CURRENT_NORMALISATION);
            if !config.weights.is_empty()
                && normalisation != Normalisation::EventWeights
            {
                bail!(
                    "Named weights require `{}` normalisation",
                    Normalisation::EventWeights
                );
            }
            let event_loop = EventLoop::new(drell_yan::charged_current_histogram(
                &config.weights,
                normalisation,
            )?);
            run(
                &config,
                normalisation,
                event_loop,
                drell_yan::charged_current_analysis(),
                output,
            )
        }
        AnalysisKind::AtlasCcdy => {
            let normalisation = resolve(atlas_ccdy::NORMALISATION);
            let event_loop = EventLoop::new(atlas_ccdy::histogram(normalisation)?);
            run(&config, normalisation, event_loop, atlas_ccdy::analysis(), output)
        }
        AnalysisKind::CmsWw => {
            let normalisation = resolve(cms_ww::NORMALISATION);
            let event_loop = EventLoop::new(cms_ww::histogram(normalisation)?);
            run(&config, normalisation, event_loop, cms_ww::analysis(), output)
        }
    }?;
    info!("done");
    Ok(())
}

fn run<S, T>(
    config: &AnalysisConfig,
    normalisation: Normalisation,
    event_loop: EventLoop<T>,
    mut analysis: EventAnalysis<S, T>,
    output: &Path,
) -> Result<()>
where
    S: Select<Event, Output = T>,
    S::Error: Into<AnalysisError>,
{
    let combination = run_samples(config, normalisation, &event_loop, &mut analysis)?;
    write_json(output, &combination)
        .with_context(|| format!("Failed to write histograms to {output:?}"))?;
    Ok(())
}
