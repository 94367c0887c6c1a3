//! Parses a request and prints what the parser extracted.
//!
//! ```text
//! cargo run --example parse_request
//! cargo run --example parse_request -- 'GET /a%20b?x=1 HTTP/1.1\r\nHost: h\r\n\r\n'
//! ```
//!
//! Literal `\r` and `\n` in the argument are turned into CR and LF.

use cell_http::{ByteBuffer, EncodingSet, Request};
use std::{env, process::ExitCode};

const SAMPLE: &str = "POST /articles/view_page/article.php?%25article=32~&lang=he HTTP/1.1\r\n\
                      Host: www.example.com\r\n\
                      User-Agent: Mozilla/5.0 (X11; Linux x86_64)\r\n\
                      Referer: www.google.com\r\n\
                      Connection: keep-alive\r\n\
                      Accept-Encoding: gzip, deflate, br, zstd\r\n\
                      Upgrade-Insecure-Requests: 1\r\n\
                      Sec-Fetch-Dest: document\r\n\
                      \r\n\
                      title=%D7%A9%D7%9C%D7%95%D7%9D";

fn main() -> ExitCode {
    let input = match env::args().nth(1) {
        Some(arg) => arg.replace("\\r", "\r").replace("\\n", "\n"),
        None => SAMPLE.to_string(),
    };

    let data = ByteBuffer::from(input.as_str());
    let mut request = Request::new();

    if let Err(err) = request.parse(&data) {
        eprintln!("{} {err}", err.status_code());
        return ExitCode::FAILURE;
    }

    println!("method:     {}", request.method());
    println!("version:    {}", request.version());
    println!("target:     {}", request.target());
    println!("path:       {}", request.uri().path());
    for (key, value) in request.uri().queries().iter() {
        println!("  query     {key} = {value}");
    }

    println!("host:       {}", request.host());
    println!("referrer:   {}", request.referrer());
    println!("user-agent: {}", request.user_agent());
    println!("connection: {:?}", request.connection());
    println!("upgrade:    {}", request.upgrade_insecure_requests());

    let encodings = request.accept_encoding();
    println!("encodings:  {encodings:?}");
    if encodings.contains(EncodingSet::ZSTD) {
        println!("  zstd responses can be sent");
    }

    for (key, value) in request.headers().iter() {
        println!("  header    {key}: {value}");
    }
    println!("body:       {} bytes", request.body().len());

    ExitCode::SUCCESS
}
