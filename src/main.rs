#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    use activity_signup::app::*;
    use activity_signup::config::ClientConfig;
    use axum::Router;
    use leptos::logging::log;
    use leptos::prelude::*;
    use leptos_axum::{generate_route_list, LeptosRoutes};

    // The activity API itself is a separate service; this process only serves the page.
    let client_config = ClientConfig::from_env();
    log!(
        "activity API at {}",
        if client_config.api_base.is_empty() {
            "same origin"
        } else {
            client_config.api_base.as_str()
        }
    );

    let conf = get_configuration(None).expect("Failed to read Leptos configuration.");
    let addr = conf.leptos_options.site_addr;
    let leptos_options = conf.leptos_options;
    // Generate the list of routes in your Leptos App
    let routes = generate_route_list(App);

    let leptos_options_clone = leptos_options.clone();
    let app = Router::new()
        .leptos_routes_with_context(
            &leptos_options,
            routes,
            // Hand the client configuration to the shell for embedding.
            {
                let client_config = client_config.clone();
                move || provide_context(client_config.clone())
            },
            // Use App for main routes.
            move || shell(leptos_options_clone.clone()),
        )
        // Use shell for fallback.
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptos_options.clone());

    log!("listening on http://{}", &addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listener.");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error.");
}

#[cfg(not(feature = "ssr"))]
pub fn main() {
    // no client-side main function
    // see lib.rs for hydration function instead
}
