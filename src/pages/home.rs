use leptos::ev;
use leptos::prelude::*;
use log::warn;

use crate::components::force_graph::ForceGraphCanvas;
use crate::config::Coordinate;
use crate::encoding::{Channel, color};
use crate::error::Parameter;
use crate::session::{Session, SessionEvent, Step, Update as SessionUpdate};

/// Dataset shown on first load.
const DEMO: &str = include_str!("../../demos/advanced.json");

/// A labelled drop-down.
#[component]
fn MenuSelect(
	label: &'static str,
	#[prop(into)] options: Signal<Vec<String>>,
	#[prop(into)] selected: Signal<String>,
	on_pick: Callback<String>,
) -> impl IntoView {
	view! {
		<label class="menu-item">
			{label}
			<select on:change=move |ev| on_pick.run(event_target_value(&ev))>
				{move || {
					options
						.get()
						.into_iter()
						.map(|option| {
							let is_selected = option == selected.get();
							let value = option.clone();
							view! {
								<option value=value selected=is_selected>
									{option}
								</option>
							}
						})
						.collect_view()
				}}
			</select>
		</label>
	}
}

/// A labelled checkbox.
#[component]
fn MenuToggle(
	label: &'static str,
	#[prop(into)] checked: Signal<bool>,
	on_toggle: Callback<bool>,
) -> impl IntoView {
	view! {
		<label class="menu-item">
			<input
				type="checkbox"
				prop:checked=move || checked.get()
				on:change=move |ev| on_toggle.run(event_target_checked(&ev))
			/>
			{label}
		</label>
	}
}

/// A labelled number field.
#[component]
fn MenuNumber(
	label: &'static str,
	#[prop(into)] value: Signal<f64>,
	on_commit: Callback<String>,
) -> impl IntoView {
	view! {
		<label class="menu-item">
			{label}
			<input
				type="text"
				size="4"
				prop:value=move || value.get().to_string()
				on:change=move |ev| on_commit.run(event_target_value(&ev))
			/>
		</label>
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let notice = RwSignal::new(None::<String>);
	let session = RwSignal::new(
		Session::from_json(DEMO)
			.inspect_err(|err| notice.set(Some(err.to_string())))
			.ok(),
	);
	let updates = RwSignal::new(None::<SessionUpdate>);
	let positions = RwSignal::new(Vec::<Coordinate>::new());
	let source = RwSignal::new(DEMO.to_string());
	let exported = RwSignal::new(String::new());

	let dispatch = move |event: SessionEvent| {
		let Some(result) = session.try_update(|s| s.as_mut().map(|s| s.apply(event))).flatten()
		else {
			return;
		};
		match result {
			Ok(update) => {
				notice.set(None);
				updates.set(Some(update));
			}
			Err(err) => notice.set(Some(err.to_string())),
		}
	};

	let load = move |_| match Session::from_json(&source.get_untracked()) {
		Ok(mut fresh) => {
			let start = fresh.start();
			positions.set(Vec::new());
			session.set(Some(fresh));
			updates.set(Some(start));
			notice.set(None);
		}
		Err(err) => {
			warn!("load failed: {}", err);
			notice.set(Some(err.to_string()));
		}
	};

	let export = move |_| {
		let coordinates = positions.get_untracked();
		let json = session.with_untracked(|s| s.as_ref().map(|s| s.export_json(&coordinates)));
		match json {
			Some(Ok(json)) => exported.set(json),
			Some(Err(err)) => notice.set(Some(err.to_string())),
			None => {}
		}
	};

	let _keys = window_event_listener(ev::keydown, move |ev| {
		let event = match ev.key().as_str() {
			"ArrowUp" => SessionEvent::StepNetwork(Step::Previous),
			"ArrowDown" => SessionEvent::StepNetwork(Step::Next),
			"ArrowLeft" => SessionEvent::StepLayer(Step::Previous),
			"ArrowRight" => SessionEvent::StepLayer(Step::Next),
			_ => return,
		};
		dispatch(event);
	});

	let read = move |f: fn(&Session) -> String| session.with(|s| s.as_ref().map(f).unwrap_or_default());
	let flag = move |f: fn(&Session) -> bool| session.with(|s| s.as_ref().is_some_and(f));
	let number = move |f: fn(&Session) -> f64| session.with(|s| s.as_ref().map_or(0.0, f));
	let parameter = move |parameter: Parameter| {
		Callback::new(move |raw: String| match raw.trim().parse::<f64>() {
			Ok(value) => dispatch(SessionEvent::SetParameter(parameter, value)),
			Err(_) => notice.set(Some(format!("{} must be a number", parameter))),
		})
	};

	let networks = Signal::derive(move || {
		session.with(|s| s.as_ref().map(|s| s.networks().to_vec()).unwrap_or_default())
	});
	let layers: Signal<Vec<String>> = Signal::derive(move || {
		session.with(|s| {
			s.as_ref()
				.map(|s| (0..s.layer_count()).map(|l| l.to_string()).collect())
				.unwrap_or_default()
		})
	});
	let color_options = Signal::derive(move || {
		session.with(|s| s.as_ref().map(|s| s.registry().color_options()).unwrap_or_default())
	});
	let size_options = Signal::derive(move || {
		session.with(|s| s.as_ref().map(|s| s.registry().size_options()).unwrap_or_default())
	});
	let palettes: Signal<Vec<String>> = Signal::derive(|| color::palette_names().into_iter().map(String::from).collect());

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas session=session updates=updates positions=positions fullscreen=true />
				<div class="graph-overlay">
					<Show when=move || notice.get().is_some()>
						<p class="notice">{move || notice.get().unwrap_or_default()}</p>
					</Show>
					<div class="menu">
						<Show when=move || { networks.get().len() > 1 }>
							<MenuSelect
								label="Network "
								options=networks
								selected=Signal::derive(move || read(|s| s.network().to_string()))
								on_pick=Callback::new(move |name: String| dispatch(SessionEvent::SelectNetwork(name)))
							/>
						</Show>
						<Show when=move || { layers.get().len() > 1 }>
							<MenuSelect
								label="Layer "
								options=layers
								selected=Signal::derive(move || read(|s| s.layer().to_string()))
								on_pick=Callback::new(move |layer: String| {
									if let Ok(layer) = layer.parse() {
										dispatch(SessionEvent::SelectLayer(layer));
									}
								})
							/>
						</Show>
						<MenuSelect
							label="Size by "
							options=size_options
							selected=Signal::derive(move || read(|s| s.size().attribute.clone()))
							on_pick=Callback::new(move |name: String| dispatch(SessionEvent::SizeBy(name)))
						/>
						<Show when=move || flag(|s| s.size().show_invert)>
							<MenuToggle
								label="invert"
								checked=Signal::derive(move || flag(|s| s.display().invert_binary_sizes))
								on_toggle=Callback::new(move |on: bool| dispatch(SessionEvent::InvertBinary(Channel::Size, on)))
							/>
						</Show>
						<MenuSelect
							label="Color by "
							options=color_options
							selected=Signal::derive(move || read(|s| s.color().attribute.clone()))
							on_pick=Callback::new(move |name: String| dispatch(SessionEvent::ColorBy(name)))
						/>
						<Show when=move || flag(|s| s.color().show_invert)>
							<MenuToggle
								label="invert"
								checked=Signal::derive(move || flag(|s| s.display().invert_binary_colors))
								on_toggle=Callback::new(move |on: bool| dispatch(SessionEvent::InvertBinary(Channel::Color, on)))
							/>
						</Show>
						<Show when=move || flag(|s| s.color().show_palette)>
							<MenuSelect
								label="Colors "
								options=palettes
								selected=Signal::derive(move || read(|s| s.display().color_palette.clone()))
								on_pick=Callback::new(move |name: String| dispatch(SessionEvent::ColorPalette(name)))
							/>
						</Show>
					</div>
					<div class="menu">
						<MenuNumber
							label="Charge "
							value=Signal::derive(move || number(|s| s.layout().parameters().charge))
							on_commit=parameter(Parameter::Charge)
						/>
						<MenuNumber
							label="Gravity "
							value=Signal::derive(move || number(|s| s.layout().parameters().gravity))
							on_commit=parameter(Parameter::Gravity)
						/>
						<MenuNumber
							label="Link length "
							value=Signal::derive(move || number(|s| s.layout().parameters().link_distance))
							on_commit=parameter(Parameter::LinkDistance)
						/>
						<MenuNumber
							label="Link strength "
							value=Signal::derive(move || number(|s| s.layout().parameters().link_strength))
							on_commit=parameter(Parameter::LinkStrength)
						/>
						<MenuNumber
							label="Radius "
							value=Signal::derive(move || number(|s| s.display().radius))
							on_commit=parameter(Parameter::Radius)
						/>
					</div>
					<div class="menu">
						<MenuToggle
							label="Freeze nodes"
							checked=Signal::derive(move || flag(|s| s.layout().is_frozen()))
							on_toggle=Callback::new(move |on: bool| dispatch(SessionEvent::Freeze(on)))
						/>
						<MenuToggle
							label="Show node names"
							checked=Signal::derive(move || flag(|s| s.display().show_node_names))
							on_toggle=Callback::new(move |on: bool| dispatch(SessionEvent::ShowNodeNames(on)))
						/>
						<MenuToggle
							label="Scale link width"
							checked=Signal::derive(move || flag(|s| s.display().scale_link_width))
							on_toggle=Callback::new(move |on: bool| dispatch(SessionEvent::ScaleLinkWidth(on)))
						/>
						<MenuToggle
							label="Scale link opacity"
							checked=Signal::derive(move || flag(|s| s.display().scale_link_opacity))
							on_toggle=Callback::new(move |on: bool| dispatch(SessionEvent::ScaleLinkOpacity(on)))
						/>
						<label class="menu-item">
							"Highlight nodes named: "
							<input
								type="text"
								prop:value=move || read(|s| s.display().name_to_match.clone())
								on:input=move |ev| dispatch(SessionEvent::MatchNames(event_target_value(&ev)))
							/>
						</label>
					</div>
					<div class="menu">
						<textarea
							rows="4"
							prop:value=move || source.get()
							on:input=move |ev| source.set(event_target_value(&ev))
						/>
						<button on:click=load>"Load dataset"</button>
						<button on:click=export>"Export"</button>
						<Show when=move || !exported.get().is_empty()>
							<textarea rows="4" readonly=true prop:value=move || exported.get() />
						</Show>
					</div>
					<p class="subtitle">
						"Arrow keys step through networks and layers. Drag nodes to reposition. Scroll to zoom."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
