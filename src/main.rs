#[macro_use]
extern crate rocket;

mod config;
mod guards;
mod models;
mod routes;
mod services;
mod utils;


use dotenvy::dotenv;
use log::info;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::http::Header;
use rocket::response::Redirect;
use rocket::{Build, Request, Response, Rocket};
use rocket_dyn_templates::{context, Template};

use crate::config::Config;

/* ----------------------------- HEADERS ----------------------------- */

pub struct SecurityHeaders;

#[rocket::async_trait]
impl Fairing for SecurityHeaders {
    fn info(&self) -> Info {
        Info {
            name: "Security headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("X-Frame-Options", "DENY"));
        response.set_header(Header::new("X-Content-Type-Options", "nosniff"));
        response.set_header(Header::new("Referrer-Policy", "same-origin"));
        response.set_header(Header::new("Cache-Control", "no-store"));
    }
}

/* ----------------------------- ERRORS ----------------------------- */

#[catch(401)]
fn unauthorized() -> Redirect {
    Redirect::to("/login")
}

#[catch(403)]
fn forbidden() -> Redirect {
    Redirect::to("/")
}

#[catch(404)]
fn not_found() -> Template {
    Template::render(
        "error",
        context! {
            title: "Page not found",
            message: "There is nothing at this address.",
        },
    )
}

#[catch(422)]
fn unprocessable() -> Template {
    Template::render(
        "error",
        context! {
            title: "Incomplete form",
            message: "Some fields were missing or invalid. Go back and try again.",
        },
    )
}

#[catch(500)]
fn internal_error() -> Template {
    Template::render(
        "error",
        context! {
            title: "Something went wrong",
            message: "Please try again in a moment.",
        },
    )
}

/* ----------------------------- LAUNCH ----------------------------- */

pub fn build(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(services::init())
        .attach(services::sweeper())
        .attach(Template::custom(|engines| {
            engines
                .tera
                .register_filter("money", utils::format::money_filter);
        }))
        .attach(SecurityHeaders)
        .mount(
            "/",
            routes![
                routes::home::index,
                // Auth
                routes::auth::login_page,
                routes::auth::login,
                routes::auth::register_page,
                routes::auth::register,
                routes::auth::logout,
                // Customer
                routes::customer::dashboard,
                routes::customer::subscribe,
                routes::customer::change_request,
                routes::customer::pause_request,
                routes::customer::file_complaint,
                // Delivery
                routes::delivery::dashboard,
                routes::delivery::mark_delivered,
                // Customer service
                routes::cse::dashboard,
                routes::cse::set_status,
                routes::cse::reply,
                // Subscription manager
                routes::subscription::dashboard,
                routes::subscription::create_plan,
                routes::subscription::update_plan,
                routes::subscription::delete_plan,
                routes::subscription::resolve,
                routes::subscription::generate_bills,
                routes::subscription::mark_paid,
                // Manager
                routes::manager::dashboard,
                routes::manager::commission_report,
                routes::manager::generate_bills,
                routes::manager::mark_paid,
                routes::manager::compute_commission,
                routes::manager::send_reminders,
            ],
        )
        .register(
            "/",
            catchers![unauthorized, forbidden, not_found, unprocessable, internal_error],
        )
}

#[launch]
fn rocket() -> Rocket<Build> {
    dotenv().ok();
    env_logger::init();

    info!("🚀 Samaachar web front end starting");

    build(Config::figment())
}
