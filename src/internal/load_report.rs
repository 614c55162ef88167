#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::pedantic)]

//! Inserts random keys into both maps and plots how load, empty buckets and
//! capacity evolve as the maps grow.
//!
//! Usage: `load_report [config.json] [output.png]`

use std::{env, error::Error};

use log::info;
use plotters::prelude::*;
use primemap::{ChainedMap, MapConfig, OpenAddressingMap, StringMap};
use rand::{Rng, distr::Alphanumeric};

const INSERTIONS: usize = 5_000;
const SAMPLE_EVERY: usize = 25;
const KEY_LENGTH: usize = 8;
const DEFAULT_OUTPUT: &str = "load_report.png";

/// One measurement of a map after some number of insertions
#[derive(Debug, Clone, Copy)]
struct Sample {
    insertions: usize,
    load: f64,
    empty_share: f64,
    capacity: usize,
}

fn sample<M: StringMap<usize>>(map: &M, insertions: usize) -> Sample {
    Sample {
        insertions,
        load: map.table_load(),
        empty_share: map.empty_buckets() as f64 / map.capacity() as f64,
        capacity: map.capacity(),
    }
}

fn random_key(rng: &mut impl Rng) -> String {
    rng.sample_iter(Alphanumeric).take(KEY_LENGTH).map(char::from).collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => MapConfig::from_path(path)?,
        None => MapConfig::default(),
    };
    let output = args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    info!("building maps from {config:?}");

    let mut open: OpenAddressingMap<usize> = config.build_open();
    let mut chained: ChainedMap<usize> = config.build_chained();
    let mut open_samples = vec![sample(&open, 0)];
    let mut chained_samples = vec![sample(&chained, 0)];

    let mut rng = rand::rng();
    for i in 1..=INSERTIONS {
        let key = random_key(&mut rng);
        open.put(key.clone(), i);
        chained.put(key, i);

        if i % SAMPLE_EVERY == 0 {
            open_samples.push(sample(&open, i));
            chained_samples.push(sample(&chained, i));
        }
    }

    info!(
        "open addressing: {} entries in {} slots, chained: {} pairs in {} buckets (longest chain {})",
        open.len(),
        open.capacity(),
        chained.len(),
        chained.capacity(),
        chained.longest_chain()
    );

    let font_family = "sans-serif";
    let series = [
        ("Open addressing", RGBColor(220, 50, 50), &open_samples),
        ("Separate chaining", RGBColor(50, 90, 220), &chained_samples),
    ];

    let root = BitMapBackend::new(&output, (1200, 1200)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((3, 1));

    let panels: [(&str, &str, fn(&Sample) -> f64); 3] = [
        ("Table load", "size / capacity", |s| s.load),
        ("Empty buckets", "share of capacity", |s| s.empty_share),
        ("Capacity", "buckets", |s| s.capacity as f64),
    ];

    for ((caption, y_desc, metric), area) in panels.iter().zip(areas.iter()) {
        let max_y = series
            .iter()
            .flat_map(|(_, _, samples)| samples.iter().map(metric))
            .fold(0.0, f64::max) *
            1.1; // Add 10% margin

        let mut chart = ChartBuilder::on(area)
            .caption(*caption, (font_family, 28))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(0..INSERTIONS, 0.0..max_y.max(1.0))?;

        chart
            .configure_mesh()
            .x_desc("Keys inserted")
            .y_desc(*y_desc)
            .axis_desc_style((font_family, 16))
            .draw()?;

        for (name, color, samples) in &series {
            let line_style = ShapeStyle::from(color).stroke_width(2);
            chart
                .draw_series(LineSeries::new(
                    samples.iter().map(|s| (s.insertions, metric(s))),
                    line_style,
                ))?
                .label(*name)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }

    root.present()?;
    println!("Generated load report: {output}");

    Ok(())
}
