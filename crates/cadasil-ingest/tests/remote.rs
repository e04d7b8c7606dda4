//! REDCap and Supabase clients against a canned local HTTP server.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use cadasil_ingest::{
    IngestError, Origin, RedcapClient, RedcapSettings, SupabaseClient, SupabaseSettings,
    load_snapshot,
};
use cadasil_model::{FieldValue, RawRecord, RecordId};

/// Serves a single response and returns the raw request it answered.
fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}", listener.local_addr().expect("addr"));
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream);
        let mut head = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read header");
            if let Some((name, value)) = line.split_once(':')
                && name.eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().expect("length");
            }
            let done = line == "\r\n";
            head.push_str(&line);
            if done {
                break;
            }
        }
        let mut body = vec![0; content_length];
        reader.read_exact(&mut body).expect("read body");
        reader
            .get_mut()
            .write_all(response.as_bytes())
            .expect("write response");
        head + &String::from_utf8_lossy(&body)
    });
    (url, handle)
}

#[test]
fn redcap_export_posts_raw_flat_form() {
    let (url, server) = serve_once(
        "200 OK",
        r#"[{"record_id":"1","sexo":"2","edad_ingresada":"47","redcap_repeat_instrument":""},
            {"record_id":"1","redcap_repeat_instrument":"seguimiento"}]"#,
    );
    let client = RedcapClient::new(RedcapSettings::new(&url, "TOKEN123")).unwrap();
    let snapshot = load_snapshot(&client);
    let request = server.join().unwrap();

    assert!(request.starts_with("POST /api/ HTTP/1.1"));
    assert!(request.contains("application/x-www-form-urlencoded"));
    assert!(request.contains("token=TOKEN123"));
    assert!(request.contains("content=record"));
    assert!(request.contains("action=export"));
    assert!(request.contains("rawOrLabel=raw"));

    assert_eq!(snapshot.origin, Origin::Redcap);
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.discarded, 1);
    let record = &snapshot.records[0];
    assert_eq!(record.record_id, RecordId::Int(1));
    assert_eq!(record.age, Some(47.0));
    assert_eq!(record.sex, Some(2));
}

#[test]
fn redcap_error_status_is_reported() {
    let (url, server) = serve_once("403 Forbidden", r#"{"error":"You do not have permissions"}"#);
    let client = RedcapClient::new(RedcapSettings::new(&url, "TOKEN123")).unwrap();
    let err = client.export_records(None).unwrap_err();
    server.join().unwrap();
    match err {
        IngestError::Http { status, message, .. } => {
            assert_eq!(status, 403);
            assert!(message.contains("permissions"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn redcap_failure_degrades_to_empty_snapshot() {
    let (url, server) = serve_once("500 Internal Server Error", "boom");
    let client = RedcapClient::new(RedcapSettings::new(&url, "TOKEN123")).unwrap();
    let snapshot = load_snapshot(&client);
    server.join().unwrap();
    assert!(snapshot.is_empty());
}

#[test]
fn redcap_import_sends_records_and_reads_count() {
    let (url, server) = serve_once("200 OK", r#"{"count": 1}"#);
    let client = RedcapClient::new(RedcapSettings::new(&url, "TOKEN123")).unwrap();
    let mut record = RawRecord::new();
    record.insert("record_id".to_string(), FieldValue::Int(9));
    let count = client.import_records(&[record]).unwrap();
    let request = server.join().unwrap();

    assert_eq!(count, 1);
    assert!(request.contains("action=import"));
    assert!(request.contains("overwriteBehavior=normal"));
    assert!(request.contains("returnContent=count"));
    assert!(request.contains("record_id"));
}

#[test]
fn redcap_metadata_lists_fields() {
    let (url, server) = serve_once(
        "200 OK",
        r#"[{"field_name":"record_id","form_name":"datos","field_type":"text","field_label":"ID"},
            {"field_name":"sexo","form_name":"datos","field_type":"radio","field_label":"Sexo",
             "select_choices_or_calculations":"1, Masculino | 2, Femenino"}]"#,
    );
    let client = RedcapClient::new(RedcapSettings::new(&url, "TOKEN123")).unwrap();
    let fields = client.export_metadata().unwrap();
    let request = server.join().unwrap();

    assert!(request.contains("content=metadata"));
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[1].choices().len(), 2);
}

#[test]
fn supabase_reads_table_with_key_headers() {
    let (url, server) = serve_once(
        "200 OK",
        r#"[{"id":5,"record_id":12,"nombre_apellido":"Ana","created_at":"2024-05-01"}]"#,
    );
    let client = SupabaseClient::new(SupabaseSettings::new(&url, "anon-key")).unwrap();
    let snapshot = load_snapshot(&client);
    let request = server.join().unwrap();

    assert!(request.starts_with("GET /rest/v1/patients?select=*&order=created_at.desc"));
    assert!(request.to_ascii_lowercase().contains("apikey: anon-key"));
    assert!(request.contains("Bearer anon-key"));
    assert_eq!(snapshot.origin, Origin::Supabase);
    assert_eq!(snapshot.records[0].record_id, RecordId::Int(12));
    assert_eq!(snapshot.records[0].full_name.as_deref(), Some("Ana"));
}

#[test]
fn unconfigured_sources_load_nothing() {
    let redcap = RedcapClient::new(RedcapSettings::default()).unwrap();
    assert!(load_snapshot(&redcap).is_empty());
    let supabase = SupabaseClient::new(SupabaseSettings::default()).unwrap();
    assert!(load_snapshot(&supabase).is_empty());
}
