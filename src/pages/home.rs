use leptos::prelude::*;
use log::debug;

use crate::components::sidebar::Sidebar;
use crate::components::tree_canvas::TreeCanvas;
use crate::projects::{Activation, ProjectList};

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let projects = RwSignal::new(ProjectList::default());
	let activation = RwSignal::new(None::<Activation>);

	let on_create = Callback::new(move |_: ()| {
		let created = projects.write().create();
		activation.set(Some(created));
	});
	let on_select = Callback::new(move |id: String| {
		if projects.with_untracked(|list| list.active() == Some(id.as_str())) {
			debug!("project {id} is already open");
			return;
		}
		if let Some(selected) = projects.write().select(&id) {
			activation.set(Some(selected));
		}
	});

	let project_list = Signal::derive(move || projects.with(|list| list.projects().to_vec()));
	let active = Signal::derive(move || projects.with(|list| list.active().map(str::to_string)));

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

			<div class="editor-layout" style="display: flex; height: 100vh;">
				<Sidebar projects=project_list active=active on_create=on_create on_select=on_select />
				<main class="editor-main" style="flex: 1; position: relative; padding: 20px;">
					<Show
						when=move || activation.with(Option::is_some)
						fallback=|| view! { <p class="editor-empty">"Create a project to start a tree."</p> }
					>
						<div class="graph-overlay">
							<h1>
								{move || {
									activation
										.with(|a| a.as_ref().map(|a| a.project().name.clone()))
										.unwrap_or_default()
								}}
							</h1>
							<p class="subtitle">
								"Drag nodes to move them. Double-click to rename. Select a node, then + adds a child and - removes it."
							</p>
						</div>
					</Show>
					<div style="height: 85vh;">
						<TreeCanvas activation=activation />
					</div>
				</main>
			</div>
		</ErrorBoundary>
	}
}
