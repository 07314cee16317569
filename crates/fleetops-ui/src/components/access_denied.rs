use yew::prelude::*;
use yew_router::prelude::*;

use crate::app::Route;

#[function_component(AccessDeniedPage)]
pub(crate) fn access_denied_page() -> Html {
    let navigator = use_navigator();
    let go_home = Callback::from(move |_: MouseEvent| {
        if let Some(navigator) = &navigator {
            navigator.push(&Route::Home);
        }
    });

    html! {
        <div class="auth-page">
            <div class="card">
                <header>
                    <h2>{"Access denied"}</h2>
                </header>
                <p class="muted">{"Your role does not have access to this page."}</p>
                <div class="actions">
                    <button class="solid" onclick={go_home}>{"Go to Dashboard"}</button>
                </div>
            </div>
        </div>
    }
}
