use dtm_rs::prelude::*;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize)]
struct ValidationData {
    name: String,
    notes: String,
    input: InputData,
    params: Params,
    #[serde(skip_deserializing)]
    result: ResultData,
}

#[derive(Debug, Deserialize, Serialize)]
struct InputData {
    /// Reference rows; ignored for `metric = "neighbors"`.
    #[serde(default)]
    reference: Vec<f64>,
    /// Query rows; the reference itself when absent.
    query: Option<Vec<f64>>,
    columns: usize,
    /// Column count of the query when it differs from the reference.
    query_columns: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
enum Estimator {
    Dtm,
    Density,
}

#[derive(Debug, Deserialize, Serialize)]
struct Params {
    estimator: Estimator,
    k: Option<usize>,
    q: Option<f64>,
    #[serde(default = "default_metric")]
    metric: String,
    weights: Option<Vec<f64>>,
    dim: Option<usize>,
    #[serde(default)]
    normalize: bool,
    n_samples: Option<usize>,
}

fn default_metric() -> String {
    "euclidean".to_string()
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ResultData {
    values: Vec<f64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let input_dir = Path::new("../output/reference");
    let output_dir = Path::new("../output/dtm_rs");

    if !input_dir.exists() {
        eprintln!(
            "Input directory {:?} does not exist. Generate reference cases first.",
            input_dir
        );
        return Ok(());
    }

    fs::create_dir_all(output_dir)?;

    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            println!("Processing {:?}", path.file_name().unwrap_or_default());
            process_file(&path, output_dir)?;
        }
    }

    Ok(())
}

fn process_file(input_path: &Path, output_dir: &Path) -> Result<(), Box<dyn Error>> {
    let file = fs::File::open(input_path)?;
    let mut data: ValidationData = serde_json::from_reader(file)?;

    let metric: Metric<f64> = data.params.metric.parse()?;
    let input = &data.input;
    let query = input.query.as_deref().unwrap_or(&input.reference);
    let query_columns = input.query_columns.unwrap_or(input.columns);

    data.result.values = match data.params.estimator {
        Estimator::Dtm => {
            let k = data.params.k.ok_or("dtm requires k")?;
            let mut builder = Dtm::new(k).metric(metric);
            if let Some(q) = data.params.q {
                builder = builder.q(q);
            }
            let mut dtm = builder.build()?;
            if metric != Neighbors {
                dtm.fit(&input.reference, input.columns)?;
            }
            dtm.transform(query, query_columns)?
        }
        Estimator::Density => {
            let params = &data.params;
            let mut builder = DtmDensityBuilder::new()
                .metric(metric)
                .normalize(params.normalize);
            if let Some(k) = params.k {
                builder = builder.k(k);
            }
            if let Some(weights) = &params.weights {
                builder = builder.weights(weights);
            }
            if let Some(q) = params.q {
                builder = builder.q(q);
            }
            if let Some(dim) = params.dim {
                builder = builder.dim(dim);
            }
            if let Some(n) = params.n_samples {
                builder = builder.n_samples(n);
            }
            let mut density = builder.build()?;
            if metric != Neighbors {
                density.fit(&input.reference, input.columns)?;
            }
            density.transform(query, query_columns)?
        }
    };

    let file_name = input_path.file_name().ok_or("input path has no file name")?;
    let output_json = serde_json::to_string_pretty(&data)?;
    fs::write(output_dir.join(file_name), output_json)?;

    Ok(())
}
