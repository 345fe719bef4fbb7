use chrono::Utc;
use clap::Parser;
use csv::ReaderBuilder;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Plot fuel burn against distance from one or more sweep CSVs"
)]
struct Cli {
    /// Sweep CSV files; each becomes one curve labeled by its file stem
    #[arg(long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,
    #[arg(long, default_value = "artifacts/fuel.png")]
    output: PathBuf,
    /// Column plotted on the y axis
    #[arg(long, default_value = "fuel_kg")]
    metric: String,
    #[arg(long, default_value_t = 1200)]
    width: u32,
    #[arg(long, default_value_t = 800)]
    height: u32,
}

#[derive(Debug, Clone)]
struct Series {
    label: String,
    points: Vec<(f64, f64)>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let series = cli
        .input
        .iter()
        .map(|path| read_series(path, &cli.metric))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let all_points = series.iter().flat_map(|s| s.points.iter());
    let (mut x_max, mut y_max) = (0.0_f64, 0.0_f64);
    let mut count = 0usize;
    for &(x, y) in all_points {
        x_max = x_max.max(x);
        y_max = y_max.max(y);
        count += 1;
    }
    if count == 0 {
        return Err(anyhow::anyhow!("No rows in the provided CSV files"));
    }
    let x_max = if x_max > 0.0 { x_max * 1.05 } else { 1.0 };
    let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let output_str = cli
        .output
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Output path contains invalid UTF-8"))?;
    let root = BitMapBackend::new(output_str, (cli.width, cli.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 18.0, FontStyle::Normal);
    let footer_font = FontDesc::new(font_family, 12.0, FontStyle::Normal);

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(format!("{} versus distance", cli.metric), caption_font)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Distance flown [km]")
        .y_desc(metric_axis_label(&cli.metric))
        .label_style(label_font.clone())
        .axis_desc_style(label_font.clone())
        .x_labels(8)
        .y_labels(8)
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    for (index, curve) in series.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();
        chart
            .draw_series(LineSeries::new(
                curve.points.iter().copied(),
                ShapeStyle::from(&color).stroke_width(2),
            ))?
            .label(curve.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart.draw_series(
            curve
                .points
                .iter()
                .map(|&point| Circle::new(point, 3, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(label_font)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    let stamp = format!("generated {}", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    root.draw(&Text::new(
        stamp,
        (10, cli.height as i32 - 18),
        footer_font.color(&BLACK.mix(0.6)),
    ))?;

    root.present()?;
    Ok(())
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

fn read_series(path: &Path, metric: &str) -> anyhow::Result<Series> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow::anyhow!("{}: CSV missing '{}' column", path.display(), name))
    };
    let distance_idx = column("distance_m")?;
    let metric_idx = column(metric)?;

    let mut points = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let parse = |idx: usize| record.get(idx).and_then(|v| v.trim().parse::<f64>().ok());
        if let (Some(distance_m), Some(value)) = (parse(distance_idx), parse(metric_idx)) {
            points.push((distance_m / 1000.0, value));
        }
    }
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let label = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sweep")
        .to_string();
    Ok(Series { label, points })
}

fn metric_axis_label(metric: &str) -> String {
    match metric {
        "fuel_kg" => "Trip fuel [kg]".to_string(),
        "final_mass_kg" => "Landing mass [kg]".to_string(),
        "takeoff_mass_kg" => "Takeoff mass [kg]".to_string(),
        other => other.to_string(),
    }
}
