//! Tera templates rendered by the plugins

use tera::{Context, Tera};

use crate::plugins::PluginError;

/// Toolkit logger set up by the example server's main function
pub const KIT_LOGGER: &str = r#"
  // Setup {{ toolkit }} logger.
  var (
    logger log.Logger
  )
  {
    logger = log.NewLogfmtLogger(os.Stderr)
    logger = log.With(logger, "ts", log.DefaultTimestampUTC)
    logger = log.With(logger, "caller", log.DefaultCaller)
  }
"#;

/// HTTP server initialization wrapping every endpoint in a toolkit transport server
pub const KIT_HTTP_SERVER_INIT: &str = r#"
  // Wrap the endpoints with the transport specific layers. The generated
  // server packages contains code generated from the design which maps
  // the service input and output data structures to HTTP requests and
  // responses.
  var (
  {%- for svc in services %}
    {%- for ep in svc.endpoints %}
    {{ svc.var_name }}{{ ep.method_var_name }}Handler *{{ transport }}.Server
    {%- endfor %}
    {{ svc.var_name }}Server *{{ svc.pkg_name }}svr.Server
  {%- endfor %}
  )
  {
    eh := errorHandler(logger)
  {%- for svc in services %}
    {%- for ep in svc.endpoints %}
    {{ svc.var_name }}{{ ep.method_var_name }}Handler = {{ transport }}.NewServer(
      {{ endpoint_type }}({{ svc.var_name }}Endpoints.{{ ep.method_var_name }}),
      {%- if ep.request_decoder %}
      {{ svc.pkg_name }}kitsvr.{{ ep.request_decoder }}(mux, dec),
      {%- else %}
      func(context.Context, *http.Request) (request interface{}, err error) { return nil, nil },
      {%- endif %}
      {{ svc.pkg_name }}kitsvr.{{ ep.response_encoder }}(enc),
    )
    {%- endfor %}
    {%- if svc.endpoints %}
    {{ svc.var_name }}Server = {{ svc.pkg_name }}svr.New({{ svc.var_name }}Endpoints, mux, dec, enc, eh)
    {%- else %}
    {{ svc.var_name }}Server = {{ svc.pkg_name }}svr.New(nil, mux, dec, enc, eh)
    {%- endif %}
  {%- endfor %}
  }

  // Configure the mux.
  {%- for svc in services %}
    {%- for ep in svc.endpoints %}
  {{ svc.pkg_name }}kitsvr.{{ ep.mount_handler }}(mux, {{ svc.var_name }}{{ ep.method_var_name }}Handler)
    {%- endfor %}
  {%- endfor %}
"#;

/// Structured logger adapter added to the gen package. `lib` is the package
/// name the logging library is imported under.
pub const STRUCTURED_LOGGER: &str = r#"
// Logger is an adapter for the structured logger of {{ api }} that
// implements the logger interface used by the generated middlewares.
type Logger struct {
	*{{ lib }}.SugaredLogger
}

// New creates a new structured logger for the service {{ api }}.
func New(serviceName string, production bool) *Logger {
	var l *{{ lib }}.Logger
	if production {
		l, _ = {{ lib }}.NewProduction()
	} else {
		l, _ = {{ lib }}.NewDevelopment()
	}
	return &Logger{l.Sugar().With("service", serviceName)}
}

// Log is called by the log middleware to log HTTP requests key values
func (logger *Logger) Log(keyvals ...interface{}) error {
	logger.Infow("", keyvals...)
	return nil
}

// Sync flushes any buffered log entries.
func (logger *Logger) Sync() error {
	return logger.SugaredLogger.Sync()
}
"#;

/// Render a template source with the given context
pub fn render(name: &str, source: &str, context: &Context) -> Result<String, PluginError> {
    let mut tera = Tera::default();
    tera.add_raw_template(name, source)?;
    Ok(tera.render(name, context)?)
}
