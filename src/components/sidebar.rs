use leptos::prelude::*;

use crate::projects::Project;

/// Project list with a create button. The active project is highlighted.
#[component]
pub fn Sidebar(
	#[prop(into)] projects: Signal<Vec<Project>>,
	#[prop(into)] active: Signal<Option<String>>,
	on_create: Callback<()>,
	on_select: Callback<String>,
) -> impl IntoView {
	view! {
		<aside class="sidebar">
			<h2>"Projects"</h2>
			<button class="sidebar-create" title="New project" on:click=move |_| on_create.run(())>
				"+"
			</button>
			<div class="sidebar-projects">
				<For
					each=move || projects.get()
					key=|project| project.id.clone()
					children=move |project| {
						let id = project.id.clone();
						let is_active = {
							let id = id.clone();
							move || active.with(|a| a.as_deref() == Some(id.as_str()))
						};
						view! {
							<button
								class="sidebar-project"
								class:active=is_active
								on:click=move |_| on_select.run(id.clone())
							>
								{project.name}
							</button>
						}
					}
				/>
			</div>
		</aside>
	}
}
