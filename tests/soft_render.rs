use webgl_triangle::backend::soft::SoftCanvas;
use webgl_triangle::backend::ShaderStage;
use webgl_triangle::renderer::{self, shader, Extent, Sources};
use webgl_triangle::Error;

const PURPLE: [u8; 4] = [255, 0, 128, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn draws_reddish_purple_triangle() {
    init();
    let canvas = SoftCanvas::new(200, 100);
    let dims = renderer::run(&canvas, &Sources::default()).unwrap();
    assert_eq!(
        dims,
        Extent {
            width: 200,
            height: 100
        }
    );
    assert_eq!(canvas.draw_calls(), 1);

    // (0,0) (0,0.5) (0.7,0) land on (100,50) (100,75) (170,50).
    let fb = canvas.snapshot();
    assert_eq!(fb.pixel(105, 52), Some(PURPLE));
    assert_eq!(fb.pixel(160, 51), Some(PURPLE));
    assert_eq!(fb.pixel(101, 72), Some(PURPLE));

    assert_eq!(fb.pixel(0, 0), Some(CLEAR));
    assert_eq!(fb.pixel(99, 60), Some(CLEAR));
    assert_eq!(fb.pixel(120, 49), Some(CLEAR));
    assert_eq!(fb.pixel(150, 70), Some(CLEAR));
    assert_eq!(fb.pixel(199, 99), Some(CLEAR));

    // Only two colors, and the triangle covers about its area:
    // 0.5 * 70 * 25 = 875 pixels.
    let filled = fb.count(PURPLE);
    assert_eq!(filled + fb.count(CLEAR), 200 * 100);
    assert!((850..=900).contains(&filled), "{} pixels filled", filled);
}

#[test]
fn surface_keeps_startup_size() {
    init();
    let canvas = SoftCanvas::new(64, 48);
    assert_eq!(canvas.size(), (300, 150));

    renderer::run(&canvas, &Sources::default()).unwrap();
    assert_eq!(canvas.size(), (64, 48));

    canvas.resize_client(640, 480);
    assert_eq!(canvas.size(), (64, 48));
    let fb = canvas.snapshot();
    assert_eq!((fb.width(), fb.height()), (64, 48));
}

#[test]
fn missing_webgl_exits_before_drawing() {
    init();
    let canvas = SoftCanvas::new(32, 32).without_webgl();
    assert_eq!(
        renderer::run(&canvas, &Sources::default()),
        Err(Error::Unsupported)
    );
    assert_eq!(canvas.draw_calls(), 0);
    // The size is still taken from the client area.
    assert_eq!(canvas.size(), (32, 32));
    assert_eq!(
        Error::Unsupported.to_string(),
        "Could not create WebGL context.  Seems unsupported."
    );
}

#[test]
fn malformed_fragment_shader_stops_before_draw() {
    init();
    let canvas = SoftCanvas::new(32, 32);
    let sources = Sources {
        vertex: shader::VERTEX,
        fragment: "precision mediump float;\nvoid main() {\n  gl_FragColor = vec4(1, 0, 0.5, 1)\n}\n",
    };
    let err = renderer::run(&canvas, &sources).unwrap_err();
    assert_eq!(
        err,
        Error::Compile {
            stage: ShaderStage::Fragment,
            log: "ERROR: 0:4: '}' : syntax error\n".to_owned(),
        }
    );
    assert_eq!(canvas.draw_calls(), 0);
    assert_eq!(canvas.snapshot().count(CLEAR), 32 * 32);
}

#[test]
fn malformed_vertex_shader_stops_before_draw() {
    init();
    let canvas = SoftCanvas::new(16, 16);
    let sources = Sources {
        vertex: "attribute vec4 a_position;\nvoid main() {\n  gl_Position = a_positon;\n}\n",
        fragment: shader::FRAGMENT,
    };
    match renderer::run(&canvas, &sources) {
        Err(Error::Compile { stage, log }) => {
            assert_eq!(stage, ShaderStage::Vertex);
            assert_eq!(log, "ERROR: 0:3: 'a_positon' : undeclared identifier\n");
        }
        other => panic!("expected a compile error, got {:?}", other),
    }
    assert_eq!(canvas.draw_calls(), 0);
}

#[test]
fn unused_position_attribute_is_reported() {
    init();
    let canvas = SoftCanvas::new(16, 16);
    let sources = Sources {
        vertex: "attribute vec4 a_position;\nvoid main() {}\n",
        fragment: shader::FRAGMENT,
    };
    assert!(matches!(
        renderer::run(&canvas, &sources),
        Err(Error::Link { .. })
    ));
    assert_eq!(canvas.draw_calls(), 0);
}
