use crate::{
    error::RosterResult,
    maud_conveniences::{form_submit_button, render_table, simple_form_element, title},
    routes::{sse::SseEvent, students::STUDENTS_PATH},
    state::RosterState,
};
use axum::extract::State;
use maud::{Markup, PreEscaped, html};

const RESET_FORM_ON_SUCCESS: &str = r"document.addEventListener('htmx:afterRequest', (e) => {
    if (e.detail.successful && e.detail.elt.id === 'new_student_form') e.detail.elt.reset();
});";

pub async fn get_index_route(State(state): State<RosterState>) -> Markup {
    let refresh_trigger = format!("load, sse:{}", SseEvent::CrudStudent.name());

    state.render(html! {
        div class="mx-auto bg-gray-800 p-8 rounded shadow-md max-w-4xl w-full flex flex-col space-y-4" {
            div sse-connect="/sse_feed" class="container flex flex-row justify-center space-x-4" {
                div id="new_student" {
                    (title("Add New Student"))
                    // json-enc so the form talks to the same JSON API as everyone else
                    form id="new_student_form" hx-post=(STUDENTS_PATH) hx-ext="json-enc" hx-swap="none" class="p-4" {
                        (simple_form_element("name", "Name", true, None, None))
                        (simple_form_element("email", "Email", true, Some("email"), None))
                        (form_submit_button(Some("Add Student")))
                    }
                }
                div id="all_students" hx-get="/internal/get_students" hx-trigger=(refresh_trigger) {}
            }
        }
        script { (PreEscaped(RESET_FORM_ON_SUCCESS)) }
    })
}

pub async fn internal_get_students(State(state): State<RosterState>) -> RosterResult<Markup> {
    let students = state.list_all().await?;

    if students.is_empty() {
        return Ok(html! {
            (title("Students"))
            p class="italic text-gray-400" {"No students yet."}
        });
    }

    let rows = students
        .into_iter()
        .map(|student| [html! {(student.name)}, html! {(student.email)}])
        .collect();

    Ok(render_table("Students", ["Name", "Email"], rows))
}
