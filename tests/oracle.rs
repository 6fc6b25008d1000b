use promptsmith::{
    CandidateFile, ModificationRequest, Promptsmith, Provider, RecordState, Settings,
};
use std::env;

// Minimal 1x1 pixel transparent PNG
const PNG_1X1: [u8; 67] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // Signature
    0x00, 0x00, 0x00, 0x0D, // IHDR length
    0x49, 0x48, 0x44, 0x52, // IHDR chunk type
    0x00, 0x00, 0x00, 0x01, // Width: 1
    0x00, 0x00, 0x00, 0x01, // Height: 1
    0x08, // Bit depth: 8
    0x06, // Color type: Truecolor with alpha
    0x00, // Compression method
    0x00, // Filter method
    0x00, // Interlace method
    0x1F, 0x15, 0xC4, 0x89, // IHDR CRC
    0x00, 0x00, 0x00, 0x0A, // IDAT length
    0x49, 0x44, 0x41, 0x54, // IDAT chunk type
    0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, // Compressed data
    0x0D, 0x0A, 0x2D, 0xB4, // IDAT CRC
    0x00, 0x00, 0x00, 0x00, // IEND length
    0x49, 0x45, 0x4E, 0x44, // IEND chunk type
    0xAE, 0x42, 0x60, 0x82, // IEND CRC
];

#[tokio::test]
async fn test_live_oracle_integration() {
    // 1. Load .env file if present
    let _ = dotenvy::dotenv();

    // 2. Only run when a Gemini key is configured
    if env::var(Provider::Gemini.api_key_var()).is_err() {
        println!("Skipping live oracle test: GEMINI_API_KEY not set");
        return;
    }

    let mut settings = Settings::default();
    settings.apply_env();
    settings.set_provider(Provider::Gemini);
    println!("Running live oracle test with model: {}", settings.model_name());

    let app = Promptsmith::from_settings(&settings).expect("oracle should build");

    // 3. Reverse prompt for a tiny PNG
    let report = app
        .ingest_files(vec![CandidateFile::from_bytes(
            "pixel.png",
            "image/png",
            PNG_1X1.to_vec(),
        )])
        .await;
    assert_eq!(report.images.len(), 1);

    let batch = app.workflow().generate_all().await.unwrap();
    let records = app.workflow().records().await;
    match records[0].state() {
        RecordState::Succeeded => {
            println!("✓ Reverse prompt: {}", records[0].prompt());
            assert!(!records[0].prompt().is_empty());
        }
        _ => panic!("Live reverse prompt failed: {:?}", records[0].error()),
    }
    assert_eq!(batch.succeeded, 1);

    // 4. Rewrite a prompt
    let rewritten = app
        .modify(&ModificationRequest::new("一只猫"))
        .await
        .unwrap_or_else(|e| panic!("Live rewrite failed: {}", e));
    println!("✓ Rewritten prompt: {}", rewritten);
    assert!(!rewritten.is_empty());
}
