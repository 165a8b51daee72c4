//! HTML shelly pro `/` a `/verify`. Samotný rendering dashboardu
//! (grafy, tabulky) žije v klientském JS — server servíruje jen kostru.

pub fn dashboard_page() -> String {
    r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Liga MX Stats</title>
</head>
<body>
    <header><h1>Liga MX — Estadísticas</h1></header>
    <main>
        <section id="standings"></section>
        <section id="livescores"></section>
        <section id="fixtures"></section>
        <section id="results"></section>
        <section id="metrics"></section>
        <section id="api-dashboard"></section>
    </main>
    <script src="/static/js/main.js"></script>
</body>
</html>
"#
    .to_string()
}

pub fn verify_page(site_key: &str, error: Option<&str>) -> String {
    let error_html = match error {
        Some(msg) => format!(r#"<p class="error">{msg}</p>"#),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="utf-8">
    <title>Verificación — Liga MX Stats</title>
    <script src="https://www.google.com/recaptcha/api.js" async defer></script>
</head>
<body>
    <h1>Verificación</h1>
    <p>Confirma que no eres un robot para continuar.</p>
    {error_html}
    <form method="post" action="/verify">
        <div class="g-recaptcha" data-sitekey="{site_key}"></div>
        <button type="submit">Continuar</button>
    </form>
</body>
</html>
"#
    )
}
