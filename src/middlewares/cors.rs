use actix_cors::Cors;

pub fn create_cors() -> Cors {
    Cors::default()
        // TODO: 上线前改为从配置读取允许的前端域名
        .allowed_origin_fn(|_, _req_head| true)
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}
