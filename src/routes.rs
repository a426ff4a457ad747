use crate::{
    api::{attendance, breaks, employee, rotation},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let scope = web::scope(&config.api_prefix).configure(configure_api);

    match build_limiter(config.rate_protected_per_min) {
        Some(limiter) => cfg.service(scope.wrap(limiter)),
        None => {
            tracing::warn!(
                rate = config.rate_protected_per_min,
                "Invalid rate limit, serving without limiter"
            );
            cfg.service(scope)
        }
    };
}

/// Every API resource, relative to the API prefix.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/employee")
            // /employee
            .service(
                web::resource("")
                    .route(web::post().to(employee::create_employee))
                    .route(web::get().to(employee::list_employees)),
            )
            // /employee/{id}
            .service(
                web::resource("/{id}")
                    .route(web::put().to(employee::update_employee))
                    .route(web::get().to(employee::get_employee))
                    .route(web::delete().to(employee::delete_employee)),
            )
            // /employee/{id}/supervisor
            .service(
                web::resource("/{id}/supervisor")
                    .route(web::put().to(employee::assign_supervisor)),
            ),
    )
    .service(web::resource("/assignment").route(web::get().to(employee::list_assignments)))
    .service(
        web::scope("/attendance")
            // /attendance
            .service(web::resource("").route(web::put().to(attendance::record_attendance)))
            // /attendance/absences/{year}/{month}
            .service(
                web::resource("/absences/{year}/{month}")
                    .route(web::get().to(attendance::absence_report)),
            )
            // /attendance/{date}
            .service(web::resource("/{date}").route(web::get().to(attendance::day_attendance))),
    )
    .service(
        web::scope("/breaks")
            .service(web::resource("/{date}").route(web::get().to(breaks::get_break_schedule)))
            .service(
                web::resource("/{date}/generate")
                    .route(web::post().to(breaks::generate_break_schedule)),
            ),
    )
    .service(
        web::scope("/rotation")
            .service(web::resource("/run").route(web::post().to(rotation::run_monthly_rotation)))
            .service(web::resource("/marker").route(web::get().to(rotation::rotation_marker)))
            .service(
                web::resource("/{year}/{month}").route(web::get().to(rotation::list_rotation)),
            )
            .service(
                web::resource("/{year}/{month}/rotate")
                    .route(web::post().to(rotation::rotate_month)),
            )
            .service(
                web::resource("/{year}/{month}/seed").route(web::post().to(rotation::seed_rotation)),
            ),
    );
}
