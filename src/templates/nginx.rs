//! Nginx virtual host template (`/etc/nginx/sites-available/<app>`)
//!
//! Static assets are served directly; everything else proxies to the app
//! server on loopback with the usual forwarding headers plus websocket
//! upgrade passthrough.

use super::managed_banner;
use crate::config::Settings;

pub fn nginx_site(settings: &Settings) -> String {
    let web = &settings.web;
    let mut out = managed_banner("#");

    let server_name = if web.domain.is_empty() {
        "_"
    } else {
        web.domain.as_str()
    };

    out.push_str(&format!(
        "server {{\n\
         \x20   listen 80;\n\
         \x20   server_name {server_name};\n\
         \n\
         \x20   location /static/ {{\n\
         \x20       alias {dir}/static/;\n\
         \x20   }}\n\
         \n\
         \x20   location / {{\n\
         \x20       proxy_pass http://127.0.0.1:{port};\n\
         \x20       proxy_set_header Host $host;\n\
         \x20       proxy_set_header X-Real-IP $remote_addr;\n\
         \x20       proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;\n\
         \x20       proxy_set_header X-Forwarded-Proto $scheme;\n\
         \x20       proxy_http_version 1.1;\n\
         \x20       proxy_set_header Upgrade $http_upgrade;\n\
         \x20       proxy_set_header Connection \"upgrade\";\n\
         \x20   }}\n\
         }}\n",
        server_name = server_name,
        dir = web.project_dir,
        port = web.bind_port,
    ));

    out
}
