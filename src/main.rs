use std::path::Path;

use anyhow::Result;
use eframe::egui;
use ndarray::Array2;
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};

use medical_image_viewer::intensity::PARAM_RANGE;
use medical_image_viewer::{extract, extract_all, ingest, DisplayParams, Plane, VolumeStore};

/// Convert an extracted (and adjusted) slice into an egui texture image.
/// The engine already applied the per-plane orientation convention, so the
/// rows map straight onto screen rows.
fn slice_to_color_image(pixels: &Array2<u8>) -> egui::ColorImage {
    let (h, w) = pixels.dim();
    let mut out = Vec::with_capacity(h * w);
    for y in 0..h {
        for x in 0..w {
            out.push(egui::Color32::from_gray(pixels[(y, x)]));
        }
    }
    egui::ColorImage {
        size: [w, h],
        pixels: out,
        source_size: egui::Vec2::new(w as f32, h as f32),
    }
}

/// Scale pixel dimensions to fit a bounding box, preserving aspect ratio.
fn fit_size(npx_w: usize, npx_h: usize, max_w: f32, max_h: f32) -> egui::Vec2 {
    let scale = (max_w / npx_w as f32).min(max_h / npx_h as f32);
    egui::vec2(npx_w as f32 * scale, npx_h as f32 * scale)
}

fn plane_style(plane: Plane) -> (&'static str, egui::Color32) {
    match plane {
        Plane::Axial => ("Axial", egui::Color32::YELLOW),
        Plane::Sagittal => ("Sagittal", egui::Color32::RED),
        Plane::Coronal => ("Coronal", egui::Color32::GREEN),
    }
}

struct ViewerApp {
    store: Option<VolumeStore>,
    params: DisplayParams,
    scroll_accum: [f32; 3],
    error_msg: Option<String>,
}

impl ViewerApp {
    fn new() -> Self {
        Self {
            store: None,
            params: DisplayParams::default(),
            scroll_accum: [0.0; 3],
            error_msg: None,
        }
    }

    fn load_from_path(&mut self, path: &str) {
        match load_nifti(path) {
            Ok(store) => {
                let (d0, d1, d2) = store.shape();
                log::info!("loaded volume ({d0}, {d1}, {d2}) from {path}");
                self.store = Some(store);
                self.scroll_accum = [0.0; 3];
                self.error_msg = None;
            }
            Err(e) => {
                self.error_msg = Some(format!("Failed to load: {e}"));
            }
        }
    }

    /// Save the current axial view, with the active brightness/contrast
    /// applied, as an 8-bit grayscale PNG.
    fn export_axial_slice(&mut self) {
        let Some(store) = self.store.as_ref() else {
            self.error_msg = Some("No volume loaded.".to_string());
            return;
        };
        let slice = extract(store.volume(), Plane::Axial, store.index(Plane::Axial));
        let adjusted = self.params.apply(&slice.pixels);
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name(format!("axial_{:03}.png", slice.index))
            .save_file()
        else {
            return;
        };
        match save_png(&adjusted, &path) {
            Ok(()) => {
                log::info!("exported axial slice {} to {}", slice.index, path.display());
                self.error_msg = None;
            }
            Err(e) => {
                self.error_msg = Some(format!("Failed to export: {e}"));
            }
        }
    }
}

fn save_png(pixels: &Array2<u8>, path: &Path) -> Result<()> {
    let (h, w) = pixels.dim();
    let data: Vec<u8> = pixels.iter().copied().collect();
    let img = image::GrayImage::from_raw(w as u32, h as u32, data)
        .ok_or_else(|| anyhow::anyhow!("pixel buffer does not match {w}x{h}"))?;
    img.save(path)?;
    Ok(())
}

/// One quadrant: slice image, label strip, index slider, crosshair guide,
/// click-to-navigate and scroll-to-step input handling.
fn plane_pane(
    ui: &mut egui::Ui,
    store: &mut VolumeStore,
    scroll_accum: &mut f32,
    plane: Plane,
    tex: &egui::TextureHandle,
    px: [usize; 2],
    cell: egui::Vec2,
) {
    let (title, color) = plane_style(plane);
    let (cell_rect, resp) = ui.allocate_exact_size(cell, egui::Sense::click_and_drag());

    let size = fit_size(px[0], px[1], cell.x, cell.y);
    let offset = egui::vec2((cell.x - size.x) / 2.0, (cell.y - size.y) / 2.0);
    let img_rect = egui::Rect::from_min_size(cell_rect.min + offset, size);
    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    ui.painter()
        .image(tex.id(), img_rect, uv, egui::Color32::WHITE);

    // Crosshair guide at this pane's recorded click point.
    if let Some((cx, cy)) = store.crosshair(plane) {
        let x = img_rect.min.x + (cx as f32 + 0.5) / px[0] as f32 * img_rect.width();
        let y = img_rect.min.y + (cy as f32 + 0.5) / px[1] as f32 * img_rect.height();
        let stroke = egui::Stroke::new(1.0, egui::Color32::RED);
        ui.painter().line_segment(
            [egui::pos2(x, img_rect.min.y), egui::pos2(x, img_rect.max.y)],
            stroke,
        );
        ui.painter().line_segment(
            [egui::pos2(img_rect.min.x, y), egui::pos2(img_rect.max.x, y)],
            stroke,
        );
    }

    let overlay_bg = egui::Color32::from_black_alpha(160);
    let strip_h = 22.0;
    let slider_strip_h = 28.0;
    let pad = 4.0;

    let label_strip =
        egui::Rect::from_min_size(cell_rect.min, egui::vec2(cell_rect.width(), strip_h));
    ui.painter().rect_filled(label_strip, 0.0, overlay_bg);
    ui.painter().text(
        label_strip.left_center() + egui::vec2(6.0, 0.0),
        egui::Align2::LEFT_CENTER,
        format!("{title}  slice {}", store.index(plane)),
        egui::FontId::proportional(14.0),
        color,
    );

    let slider_strip = egui::Rect::from_min_size(
        egui::pos2(cell_rect.min.x, cell_rect.max.y - slider_strip_h),
        egui::vec2(cell_rect.width(), slider_strip_h),
    );
    ui.painter().rect_filled(slider_strip, 0.0, overlay_bg);
    let max = *store.bounds(plane).end() as u64;
    let mut value = store.index(plane) as u64;
    let slider = ui.put(
        slider_strip.shrink(pad),
        egui::Slider::new(&mut value, 0..=max),
    );
    if slider.changed() {
        if let Err(e) = store.set_index(plane, value as usize) {
            log::warn!("slider update rejected: {e}");
        }
    }

    // Click or drag inside the image moves the crosshair and the two
    // sibling slice indices.
    if resp.clicked() || resp.dragged() {
        if let Some(pos) = resp.interact_pointer_pos() {
            if img_rect.contains(pos) {
                let x = ((pos.x - img_rect.min.x) / img_rect.width() * px[0] as f32) as usize;
                let y = ((pos.y - img_rect.min.y) / img_rect.height() * px[1] as f32) as usize;
                store.click(plane, x.min(px[0] - 1), y.min(px[1] - 1));
            }
        }
    }

    // Mouse wheel steps through slices while hovering this pane.
    if ui.rect_contains_pointer(cell_rect) {
        *scroll_accum += ui.input(|i| i.raw_scroll_delta.y);
        let step = 30.0_f32;
        while *scroll_accum >= step {
            *scroll_accum -= step;
            let idx = store.index(plane);
            if idx < max as usize {
                store.set_index(plane, idx + 1).ok();
            }
        }
        while *scroll_accum <= -step {
            *scroll_accum += step;
            let idx = store.index(plane);
            if idx > 0 {
                store.set_index(plane, idx - 1).ok();
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open NIfTI…").clicked() {
                        ui.close();
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("NIfTI", &["nii", "gz"])
                            .pick_file()
                        {
                            self.load_from_path(&path.to_string_lossy());
                        }
                    }
                    if ui.button("Export Axial Slice…").clicked() {
                        ui.close();
                        self.export_axial_slice();
                    }
                });
            });
            if let Some(ref msg) = self.error_msg {
                ui.colored_label(egui::Color32::RED, msg);
            }
        });

        let frame = egui::Frame::new()
            .fill(egui::Color32::BLACK)
            .inner_margin(0.0);
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            let Some(store) = self.store.as_mut() else {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new(
                            "No volume loaded.\nUse File > Open NIfTI… to open a file.",
                        )
                        .color(egui::Color32::GRAY)
                        .size(20.0),
                    );
                });
                return;
            };

            let params = self.params;
            let panes: Vec<(Plane, egui::TextureHandle, [usize; 2])> = extract_all(store)
                .iter()
                .map(|slice| {
                    let adjusted = params.apply(&slice.pixels);
                    let (h, w) = adjusted.dim();
                    let tex = ui.ctx().load_texture(
                        slice.plane.to_string(),
                        slice_to_color_image(&adjusted),
                        egui::TextureOptions::LINEAR,
                    );
                    (slice.plane, tex, [w, h])
                })
                .collect();

            let avail = ui.available_size();
            let spacing = ui.spacing().item_spacing;
            let cell = egui::vec2((avail.x - spacing.x) / 2.0, (avail.y - spacing.y) / 2.0);

            let scroll = &mut self.scroll_accum;

            // ── Top row: axial and sagittal ─────────────────────────
            ui.horizontal(|ui| {
                for (plane, tex, px) in &panes[..2] {
                    ui.allocate_ui(cell, |ui| {
                        plane_pane(ui, store, &mut scroll[plane.axis()], *plane, tex, *px, cell);
                    });
                }
            });

            // ── Bottom row: coronal and the shared controls ─────────
            ui.horizontal(|ui| {
                let (plane, tex, px) = &panes[2];
                ui.allocate_ui(cell, |ui| {
                    plane_pane(ui, store, &mut scroll[plane.axis()], *plane, tex, *px, cell);
                });

                ui.allocate_ui(cell, |ui| {
                    ui.vertical(|ui| {
                        ui.add_space(8.0);
                        ui.heading("Display");
                        ui.add(
                            egui::Slider::new(&mut self.params.brightness, PARAM_RANGE)
                                .text("Brightness"),
                        );
                        ui.add(
                            egui::Slider::new(&mut self.params.contrast, PARAM_RANGE)
                                .text("Contrast"),
                        );
                        if ui.button("Reset").clicked() {
                            self.params = DisplayParams::default();
                        }
                        ui.separator();
                        let (d0, d1, d2) = store.shape();
                        ui.label(format!("Volume  {d0} × {d1} × {d2}"));
                        let idx = store.indices();
                        ui.label(format!(
                            "Indices  axial {}, sagittal {}, coronal {}",
                            idx.axial, idx.sagittal, idx.coronal
                        ));
                        ui.add_space(8.0);
                        ui.label(
                            egui::RichText::new(
                                "Click a view to move the crosshair.\n\
                                 Scroll to step through slices.",
                            )
                            .color(egui::Color32::GRAY),
                        );
                    });
                });
            });
        });

        ctx.request_repaint(); // keeps the UI responsive
    }
}

fn load_nifti(path: &str) -> Result<VolumeStore> {
    let obj = ReaderOptions::new().read_file(path)?;
    let volume = obj.into_volume().into_ndarray::<f32>()?;
    let volume = volume.into_dimensionality::<ndarray::Ix3>()?;
    let volume = ingest::from_nifti(volume)?;
    Ok(VolumeStore::new(volume)?)
}

fn main() -> Result<()> {
    env_logger::init();
    let app = ViewerApp::new();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "3D Medical Image Viewer",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
