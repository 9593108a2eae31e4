//! Confusion-matrix heatmap rendering.

use std::path::Path;

use ndarray::Array2;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

const IMAGE_SIZE: (u32, u32) = (1000, 800);

/// Renders the confusion matrix as an annotated PNG heatmap.
///
/// Rows are actual classes (top to bottom), columns predicted classes. Cell
/// shading scales with the count relative to the largest cell; every cell is
/// annotated with its raw count.
pub fn plot_confusion_matrix<P: AsRef<Path>>(
    path: P,
    confusion: &Array2<usize>,
    class_names: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let n = class_names.len() as i32;
    let max_count = confusion.iter().copied().max().unwrap_or(0).max(1);

    let root = BitMapBackend::new(path.as_ref(), IMAGE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Confusion Matrix", ("sans-serif", 28))
        .x_label_area_size(60)
        .y_label_area_size(120)
        .build_cartesian_2d(0..n, n..0)?;

    // Integer ticks sit on cell edges; class names are drawn by hand at the
    // cell centers below, so the mesh labels stay blank.
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("Predicted")
        .y_desc("Actual")
        .x_label_formatter(&|_| String::new())
        .y_label_formatter(&|_| String::new())
        .draw()?;

    chart.draw_series((0..n).flat_map(|row| {
        let matrix = &confusion;
        (0..n).map(move |col| {
            let count = matrix[[row as usize, col as usize]];
            let intensity = count as f64 / max_count as f64;
            let shade = (255.0 - 205.0 * intensity) as u8;
            Rectangle::new(
                [(col, row), (col + 1, row + 1)],
                RGBColor(shade, shade, 255).filled(),
            )
        })
    }))?;

    // Pixel size of one cell, for centering annotations.
    let (x_pixels, y_pixels) = chart.plotting_area().dim_in_pixel();
    let cell_w = x_pixels as i32 / n;
    let cell_h = y_pixels as i32 / n;

    let dark_style = TextStyle::from(("sans-serif", 18))
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    let light_style = TextStyle::from(("sans-serif", 18))
        .color(&WHITE)
        .pos(Pos::new(HPos::Center, VPos::Center));

    let mut annotations = Vec::new();
    for row in 0..n {
        for col in 0..n {
            let count = confusion[[row as usize, col as usize]];
            let intensity = count as f64 / max_count as f64;
            let style = if intensity > 0.5 {
                light_style.clone()
            } else {
                dark_style.clone()
            };
            annotations.push(
                EmptyElement::at((col, row))
                    + Text::new(format!("{}", count), (cell_w / 2, cell_h / 2), style),
            );
        }
    }
    chart.draw_series(annotations)?;

    // Class names centered on each column (below the x axis) and each row
    // (left of the y axis), matching the cell midpoints.
    let x_name_style = TextStyle::from(("sans-serif", 18))
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    let y_name_style = TextStyle::from(("sans-serif", 18))
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));

    let mut labels = Vec::new();
    for (index, name) in class_names.iter().enumerate() {
        let index = index as i32;
        labels.push(
            EmptyElement::at((index, n))
                + Text::new(name.clone(), (cell_w / 2, 8), x_name_style.clone()),
        );
        labels.push(
            EmptyElement::at((0, index))
                + Text::new(name.clone(), (-8, cell_h / 2), y_name_style.clone()),
        );
    }
    chart.draw_series(labels)?;

    root.present()?;
    Ok(())
}
