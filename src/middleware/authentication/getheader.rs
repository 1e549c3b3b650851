use actix_web::{dev::ServiceRequest, http::header::HeaderName};
use std::str::FromStr;

pub fn get_header<T>(req: &ServiceRequest, header_name: &'static str) -> Result<Option<T>, String>
where
    T: FromStr,
{
    req.headers()
        .get(HeaderName::from_static(header_name))
        .map(|value| {
            value
                .to_str()
                .map_err(|_| format!("header {header_name} can't be converted to string"))?
                .parse::<T>()
                .map_err(|_| format!("header {header_name} has wrong type"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn missing_header_is_none() {
        let req = TestRequest::default().to_srv_request();
        assert_eq!(get_header::<String>(&req, "authorization"), Ok(None));
    }

    #[test]
    fn header_is_parsed() {
        let req = TestRequest::default()
            .insert_header(("x-page", "3"))
            .to_srv_request();
        assert_eq!(get_header::<i64>(&req, "x-page"), Ok(Some(3)));
        assert!(get_header::<uuid::Uuid>(&req, "x-page").is_err());
    }
}
