#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const ACCEPT_TIMEOUT: Duration = Duration::from_secs(15);

fn accept(listener: &TcpListener) -> Option<TcpStream> {
    let deadline = Instant::now() + ACCEPT_TIMEOUT;
    while Instant::now() < deadline {
        match listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false).ok()?;
                return Some(stream);
            }
            Err(_) => thread::sleep(Duration::from_millis(10)),
        }
    }
    None
}

/// One series with two samples, ten minutes apart.
pub fn two_sample_matrix(name: &str) -> String {
    format!(
        r#"{{"status":"success","data":{{"resultType":"matrix","result":[
            {{"metric":{{"__name__":"{}"}},"values":[[1700000000,"1.23456"],[1700000600,"2"]]}}
        ]}}}}"#,
        name
    )
}

pub fn error_body() -> String {
    String::from(r#"{"status":"error","errorType":"bad_data","error":"1:5: parse error"}"#)
}

/// Serves one canned response per connection, in order, and returns the request lines.
/// Gives up on connections that never arrive.
pub fn serve(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let stream = match accept(&listener) {
                Some(stream) => stream,
                None => break,
            };
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                let read = reader.read_line(&mut header).unwrap();
                if read == 0 || header == "\r\n" {
                    break;
                }
            }
            requests.push(request_line.trim_end().to_string());

            let reason = if status == 200 { "OK" } else { "Bad Request" };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
        requests
    });

    (address, handle)
}

pub fn direct_http() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder().no_proxy().build().unwrap()
}
