use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::ForceGraphState;

const BACKGROUND: &str = "#ffffff";
const LINK_RGB: &str = "153, 153, 153";
const LEGEND_FONT_PX: f64 = 12.0;
const LEGEND_MARGIN: f64 = 15.0;

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_links(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
	draw_legends(state, ctx);
}

fn draw_links(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let positions = state.positions();
	for link in &state.data.links {
		let (Some(a), Some(b)) = (positions.get(link.source), positions.get(link.target)) else {
			continue;
		};
		if link.width <= 0.0 {
			continue;
		}
		let active = [link.source, link.target]
			.into_iter()
			.filter_map(|idx| state.handle(idx))
			.any(|handle| state.is_hovered(handle));
		let opacity = if active { 1.0 } else { link.opacity };
		ctx.set_stroke_style_str(&format!("rgba({}, {})", LINK_RGB, opacity));
		ctx.set_line_width(link.width / state.transform.k.max(0.5));
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));

	state.graph.visit_nodes(|node| {
		let Some(info) = state.data.nodes.get(node.data.user_data.idx) else {
			return;
		};
		let (x, y) = (node.x() as f64, node.y() as f64);
		let handle = node.index();
		let focused = state.is_hovered(handle) || state.is_neighbor(handle);

		ctx.begin_path();
		let _ = ctx.arc(x, y, info.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&info.color);
		ctx.fill();

		// matched names get a dashed ring
		let outline = if info.highlighted || state.is_hovered(handle) { 2.0 } else { 1.0 };
		ctx.set_stroke_style_str("#ffffff");
		ctx.set_line_width(outline / k);
		ctx.stroke();
		if info.highlighted {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(3.0 / k),
				&JsValue::from_f64(2.0 / k),
			));
			ctx.set_stroke_style_str("#000000");
			ctx.stroke();
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		if state.data.show_labels || info.highlighted || focused {
			ctx.set_fill_style_str("#333333");
			let _ = ctx.fill_text(&info.label, x + info.radius + 3.0, y + 3.0);
		}
	});
}

fn draw_legends(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_font(&format!("{}px sans-serif", LEGEND_FONT_PX));
	let mut top = LEGEND_MARGIN;

	for legend in &state.data.legends {
		let widest = legend
			.entries
			.iter()
			.map(|e| e.radius)
			.fold(LEGEND_FONT_PX / 2.0, f64::max);

		ctx.set_fill_style_str("#000000");
		let _ = ctx.fill_text(&legend.title, LEGEND_MARGIN, top + LEGEND_FONT_PX);
		top += LEGEND_FONT_PX * 1.5;

		for entry in &legend.entries {
			let cy = top + widest;
			ctx.begin_path();
			let _ = ctx.arc(LEGEND_MARGIN + widest, cy, entry.radius, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(&entry.color);
			ctx.fill();
			ctx.set_fill_style_str("#000000");
			let _ = ctx.fill_text(
				&entry.label,
				LEGEND_MARGIN + widest * 2.0 + 8.0,
				cy + LEGEND_FONT_PX / 3.0,
			);
			top += widest * 2.0 + 4.0;
		}
		top += LEGEND_MARGIN;
	}
}
