//! Command line tool for predicting flairs

use anyhow::{anyhow, Result};
use burn::backend::{ndarray::NdArrayDevice, NdArray};
use flair_classifier::{
    pipelines::text_classification::Classifier, server::config::DEFAULT_ARTIFACT_DIR,
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: infer [OPTIONS] TITLE...

Arguments:
  TITLE                One or more post titles to classify

Options:
  -h, --help           Print help
  -a, --artifact-dir   Directory with the model artifacts (default: 'models')
";

#[derive(Debug)]
struct Args {
    /// Prints the usage menu
    help: bool,

    /// Directory with the model artifacts
    artifact_dir: Option<String>,

    /// The titles to classify
    titles: Vec<String>,
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut pargs = Arguments::from_env();

    let help = pargs.contains(["-h", "--help"]);
    let artifact_dir = pargs.opt_value_from_str(["-a", "--artifact-dir"])?;

    let titles = pargs
        .finish()
        .into_iter()
        .map(|title| title.to_string_lossy().into_owned())
        .collect();

    Ok(Args {
        help,
        artifact_dir,
        titles,
    })
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = parse_args()?;

    if args.help {
        println!("{}", HELP);
        return Ok(());
    }

    if args.titles.is_empty() {
        return Err(anyhow!("At least one title is required\n\n{}", HELP));
    }

    let artifact_dir = args
        .artifact_dir
        .unwrap_or_else(|| DEFAULT_ARTIFACT_DIR.to_string());

    let classifier = Classifier::<NdArray>::load(&artifact_dir, NdArrayDevice::Cpu)?;

    // Titles double as their own identifiers, so positions are used to keep duplicates apart
    let ids: Vec<String> = (0..args.titles.len()).map(|i| i.to_string()).collect();

    let predictions = classifier.predict(&args.titles, &ids)?;

    for (i, (text, id)) in args.titles.iter().zip(&ids).enumerate() {
        let class = predictions
            .get(id)
            .ok_or_else(|| anyhow!("No prediction for item {}", i))?;

        println!(
            "\n=== Item {i} ===\
             \n- Text: {text}\
             \n- Class: {class}\
             \n================"
        );
    }

    Ok(())
}
